use std::sync::Arc;

use async_graphql::{Context, Enum, Object, SimpleObject};
use geotour_shared::{
    calc, geofence,
    models::{self, GeoCoordinate, Locale, Position},
};

use crate::assets::Assets;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Default)]
pub enum GqlLocale {
    #[default]
    En,
    De,
}

impl From<GqlLocale> for Locale {
    fn from(l: GqlLocale) -> Self {
        match l {
            GqlLocale::En => Locale::En,
            GqlLocale::De => Locale::De,
        }
    }
}

// GraphQL output types

#[derive(SimpleObject, Clone)]
pub struct GqlCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoCoordinate> for GqlCoordinate {
    fn from(c: GeoCoordinate) -> Self {
        GqlCoordinate {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlPoi {
    pub id: String,
    pub coordinates: GqlCoordinate,
    /// Meters.
    pub geofence_radius: f64,
    pub name: String,
    pub description: String,
    pub has_quiz: bool,
}

impl GqlPoi {
    fn localized(poi: &models::Poi, locale: Locale, has_quiz: bool) -> Self {
        GqlPoi {
            id: poi.id.clone(),
            coordinates: poi.coordinates.into(),
            geofence_radius: poi.geofence_radius,
            name: poi.name.get(locale).to_string(),
            description: poi.description.get(locale).to_string(),
            has_quiz,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: u32,
}

#[derive(SimpleObject)]
pub struct GqlQuiz {
    pub poi_id: String,
    pub questions: Vec<GqlQuestion>,
}

impl GqlQuiz {
    fn localized(set: &models::QuizSet, locale: Locale) -> Self {
        GqlQuiz {
            poi_id: set.poi_id.clone(),
            questions: set
                .questions
                .iter()
                .map(|q| GqlQuestion {
                    prompt: q.prompt.get(locale).to_string(),
                    options: q.options.iter().map(|o| o.get(locale).to_string()).collect(),
                    correct_index: q.correct_index as u32,
                })
                .collect(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlPoiDistance {
    pub poi_id: String,
    pub distance: f64,
    pub in_range: bool,
    /// Initial compass bearing from the visitor to the POI, degrees.
    pub bearing: f64,
}

impl GqlPoiDistance {
    fn new(d: geofence::PoiDistance, from: GeoCoordinate, to: GeoCoordinate) -> Self {
        GqlPoiDistance {
            poi_id: d.poi_id,
            distance: d.distance,
            in_range: d.in_range,
            bearing: calc::bearing(from, to),
        }
    }
}

fn locale_or_default(locale: Option<GqlLocale>) -> Locale {
    locale.unwrap_or_default().into()
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn pois(
        &self,
        ctx: &Context<'_>,
        locale: Option<GqlLocale>,
    ) -> async_graphql::Result<Vec<GqlPoi>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let locale = locale_or_default(locale);
        Ok(assets
            .pois
            .iter()
            .map(|p| GqlPoi::localized(p, locale, assets.find_quiz(&p.id).is_some()))
            .collect())
    }

    async fn poi(
        &self,
        ctx: &Context<'_>,
        id: String,
        locale: Option<GqlLocale>,
    ) -> async_graphql::Result<Option<GqlPoi>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let locale = locale_or_default(locale);
        Ok(assets
            .find_poi(&id)
            .map(|p| GqlPoi::localized(p, locale, assets.find_quiz(&p.id).is_some())))
    }

    async fn quiz(
        &self,
        ctx: &Context<'_>,
        poi_id: String,
        locale: Option<GqlLocale>,
    ) -> async_graphql::Result<Option<GqlQuiz>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let locale = locale_or_default(locale);
        Ok(assets
            .find_quiz(&poi_id)
            .map(|q| GqlQuiz::localized(q, locale)))
    }

    /// Distance and range flag for every POI as seen from the given point.
    async fn proximity(
        &self,
        ctx: &Context<'_>,
        latitude: f64,
        longitude: f64,
    ) -> async_graphql::Result<Vec<GqlPoiDistance>> {
        let position = checked_position(latitude, longitude)?;
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(geofence::distances(&position, &assets.pois)
            .into_iter()
            .zip(&assets.pois)
            .map(|(d, poi)| GqlPoiDistance::new(d, position.coordinates, poi.coordinates))
            .collect())
    }

    /// The closest POI to the given point, if any POIs exist.
    async fn nearest_poi(
        &self,
        ctx: &Context<'_>,
        latitude: f64,
        longitude: f64,
    ) -> async_graphql::Result<Option<GqlPoiDistance>> {
        let position = checked_position(latitude, longitude)?;
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(geofence::nearest(&position, &assets.pois).and_then(|d| {
            let target = assets.find_poi(&d.poi_id)?.coordinates;
            Some(GqlPoiDistance::new(d, position.coordinates, target))
        }))
    }
}

fn checked_position(latitude: f64, longitude: f64) -> async_graphql::Result<Position> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(async_graphql::Error::new("Coordinates out of range"));
    }
    Ok(Position {
        coordinates: GeoCoordinate::new(latitude, longitude),
        timestamp_ms: 0.0,
    })
}

pub type Schema = async_graphql::Schema<
    QueryRoot,
    async_graphql::EmptyMutation,
    async_graphql::EmptySubscription,
>;

pub fn build_schema(assets: Arc<Assets>) -> Schema {
    async_graphql::Schema::build(
        QueryRoot,
        async_graphql::EmptyMutation,
        async_graphql::EmptySubscription,
    )
    .data(assets)
    .finish()
}
