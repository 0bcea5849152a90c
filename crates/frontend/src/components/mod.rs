pub mod error_banner;
pub mod language_switch;
pub mod map_view;
pub mod quiz_dialog;
pub mod recenter_button;
