//! tracing 구독자 초기화.

use tracing_subscriber::EnvFilter;

/// 설정의 로그 레벨로 stderr 로거를 켠다. RUST_LOG가 있으면 그 값을 쓴다.
/// 이미 초기화되어 있으면 아무 것도 하지 않는다.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("dafd_toolbox={level},dafd={level},dafd_cli={level}"))
    });
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = result {
        tracing::debug!("tracing already initialised: {e}");
    }
}
