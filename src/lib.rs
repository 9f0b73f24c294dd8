//! 입력 검증/예측 디스패치 로직을 라이브러리로 분리하여 GUI와 CLI가 함께 쓴다.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod i18n;
pub mod logging;
pub mod metadata;
pub mod predict;
pub mod ui_cli;
pub mod validation;
