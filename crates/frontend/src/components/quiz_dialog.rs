use dioxus::prelude::*;
use geotour_shared::i18n;
use geotour_shared::models::{Locale, Question, QuizSet};
use geotour_shared::quiz::{AnswerOutcome, QuizProgress};

/// Quiz for the POI the visitor just unlocked.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizState {
    Loading { poi_id: String },
    Ready(QuizSet),
    Missing { poi_id: String },
    Failed(String),
}

impl QuizState {
    pub fn poi_id(&self) -> Option<&str> {
        match self {
            QuizState::Loading { poi_id } | QuizState::Missing { poi_id } => Some(poi_id),
            QuizState::Ready(set) => Some(&set.poi_id),
            QuizState::Failed(_) => None,
        }
    }

    /// Whether a fetch result for `poi_id` is still awaited.
    pub fn is_loading(&self, poi_id: &str) -> bool {
        matches!(self, QuizState::Loading { poi_id: id } if id == poi_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Answered {
    question: Question,
    chosen: usize,
    outcome: AnswerOutcome,
}

fn option_class(index: usize, answered: Option<&Answered>) -> &'static str {
    match answered {
        None => "quiz-option",
        Some(a) if index == a.outcome.correct_index => "quiz-option correct",
        Some(a) if index == a.chosen => "quiz-option wrong",
        Some(_) => "quiz-option",
    }
}

#[component]
pub fn QuizPanel(state: QuizState, poi_name: String, locale: Locale, on_close: EventHandler<()>) -> Element {
    let title = i18n::quiz_title(&poi_name);
    let body = match state {
        QuizState::Ready(set) => {
            let key = set.poi_id.clone();
            rsx! {
                QuizQuestions { key: "{key}", quiz: set, locale, on_close }
            }
        }
        QuizState::Loading { .. } => rsx! {
            p { class: "quiz-status", "…" }
        },
        QuizState::Missing { .. } => {
            let text = i18n::quiz_unavailable(locale);
            rsx! {
                p { class: "quiz-status", "{text}" }
            }
        }
        QuizState::Failed(message) => rsx! {
            p { class: "quiz-status error", "{message}" }
        },
    };

    rsx! {
        div {
            class: "quiz-backdrop",
            onclick: move |_| on_close.call(()),

            div {
                class: "quiz-dialog",
                role: "dialog",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                div { class: "quiz-header",
                    h2 { "{title}" }
                    button {
                        class: "secondary",
                        "aria-label": i18n::close(locale),
                        onclick: move |_| on_close.call(()),
                        "×"
                    }
                }
                {body}
            }
        }
    }
}

#[component]
fn QuizQuestions(quiz: QuizSet, locale: Locale, on_close: EventHandler<()>) -> Element {
    let mut progress = use_signal(|| QuizProgress::new(&quiz));
    let mut answered = use_signal(|| None::<Answered>);

    let snapshot = answered.read().clone();
    let finished = progress.read().is_finished();

    if finished && snapshot.is_none() {
        let p = progress.read();
        let score = i18n::quiz_score(p.score(), p.total(), locale);
        let close = i18n::close(locale);
        return rsx! {
            p { class: "quiz-score", "{score}" }
            button { onclick: move |_| on_close.call(()), "{close}" }
        };
    }

    let question = match &snapshot {
        Some(a) => a.question.clone(),
        None => match progress.read().current() {
            Some(q) => q.clone(),
            None => return rsx! {},
        },
    };
    let step = {
        let p = progress.read();
        let shown = if snapshot.is_some() {
            p.position()
        } else {
            p.position() + 1
        };
        format!("{shown} / {}", p.total())
    };
    let prompt = question.prompt.get(locale).to_string();
    let options: Vec<(usize, String, &'static str)> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, o)| (i, o.get(locale).to_string(), option_class(i, snapshot.as_ref())))
        .collect();
    let locked = snapshot.is_some();
    let feedback = snapshot.as_ref().map(|a| {
        let (class, verdict) = if a.outcome.correct {
            ("quiz-feedback correct", i18n::quiz_correct(locale))
        } else {
            ("quiz-feedback wrong", i18n::quiz_wrong(locale))
        };
        let next = if a.outcome.finished {
            i18n::close(locale)
        } else {
            i18n::quiz_next(locale)
        };
        (class, verdict, next)
    });

    rsx! {
        p { class: "quiz-step", "{step}" }
        p { class: "quiz-prompt", "{prompt}" }
        div { class: "quiz-options",
            for (i, text, class) in options {
                button {
                    key: "{i}",
                    class: "{class}",
                    disabled: locked,
                    onclick: {
                        let question = question.clone();
                        move |_| {
                            let result = progress.write().answer(i);
                            match result {
                                Ok(outcome) => answered.set(Some(Answered {
                                    question: question.clone(),
                                    chosen: i,
                                    outcome,
                                })),
                                Err(err) => tracing::warn!(%err, "quiz answer rejected"),
                            }
                        }
                    },
                    "{text}"
                }
            }
        }
        if let Some((class, verdict, next)) = feedback {
            p { class: "{class}", "{verdict}" }
            button {
                onclick: move |_| answered.set(None),
                "{next}"
            }
        }
    }
}
