use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::i18n::{self, Translator};
use crate::metadata::MetadataError;
use crate::predict::DatasetModel;
use crate::ui_cli::{self, MenuChoice};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 콘솔 입출력 오류
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("설정 오류: {0}")]
    Config(#[from] crate::config::ConfigError),
    /// 모델/메타데이터 로드 오류
    #[error("모델 오류: {0}")]
    Metadata(#[from] MetadataError),
    /// 입력 파싱 또는 예측 실패로 동작이 중단됨
    #[error("{0}")]
    Dispatch(#[from] DispatchError),
}

/// 대화형 CLI의 메인 루프를 실행한다.
/// 한 동작의 입력/예측 오류는 출력만 하고 다음 메뉴로 돌아간다.
pub fn run(model: &DatasetModel, tr: &Translator) -> Result<(), AppError> {
    loop {
        let outcome = match ui_cli::main_menu(tr)? {
            MenuChoice::RunInverse => ui_cli::handle_inverse(tr, model.table(), model),
            MenuChoice::RunForward => ui_cli::handle_forward(tr, model.table(), model),
            MenuChoice::ShowRanges => {
                ui_cli::print_ranges(tr, model.table());
                Ok(())
            }
            MenuChoice::Exit => {
                println!("{}", tr.t(i18n::keys::APP_EXIT));
                break;
            }
        };
        match outcome {
            Ok(()) => {}
            Err(AppError::Dispatch(e)) => {
                tracing::error!("action aborted: {e}");
                eprintln!("{}", ui_cli::error_line(tr, &e));
            }
            Err(other) => return Err(other),
        }
    }
    Ok(())
}
