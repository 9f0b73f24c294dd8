use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use dafd_toolbox::{
    app::{self, AppError},
    config,
    dispatch::{self, FormSnapshot},
    i18n::{self, Translator},
    logging,
    predict::DatasetModel,
    ui_cli::{self, ConsoleWarnings},
};

/// DAFD 명령줄 도구. 하위 명령이 없으면 대화형 메뉴를 띄운다.
#[derive(Debug, Parser)]
#[command(name = "dafd_cli", version, about = "Droplet microfluidics design assistant")]
struct Cli {
    /// 설정 파일 경로 (기본: ./dafd.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 언어 (auto/en-us/ko-kr)
    #[arg(short = 'L', long, default_value = "auto")]
    lang: String,
    /// 설정의 모델 파일 대신 사용할 모델 파일
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 파라미터별 유효 범위를 출력한다
    Ranges,
    /// 제약/목표값으로 역방향 설계를 실행한다 ("Run DAFD")
    Inverse {
        #[arg(short, long = "set", value_name = "NAME=TEXT", value_parser = ui_cli::parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// 입력 파라미터 값으로 순방향 모델을 실행한다
    Forward {
        #[arg(short, long = "set", value_name = "NAME=TEXT", value_parser = ui_cli::parse_assignment)]
        set: Vec<(String, String)>,
    },
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() -> ExitCode {
    let cli = Cli::parse();
    // 설정을 읽기 전에도 오류를 번역할 수 있도록 CLI 플래그/시스템 언어로 만든다.
    let tr = Translator::new(&i18n::resolve_language(&cli.lang, None));
    match try_run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("{}", ui_cli::error_line(&tr, &err));
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_or_create(path)?,
        None => config::load_or_default()?,
    };
    logging::init(&cfg.log_level);
    if let Some(model) = &cli.model {
        cfg.model_path = Some(model.display().to_string());
    }

    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let tr = Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());
    let model = cfg.load_model()?;
    tracing::info!(samples = model.len(), lang = %lang, "model ready");

    match cli.command {
        None => app::run(&model, &tr),
        Some(Command::Ranges) => {
            ui_cli::print_ranges(&tr, model.table());
            Ok(())
        }
        Some(Command::Inverse { set }) => {
            let form = snapshot(&model, set);
            let text =
                dispatch::run_inverse(model.table(), &model, &form, &mut ConsoleWarnings::new(&tr))?;
            println!("{text}");
            Ok(())
        }
        Some(Command::Forward { set }) => {
            let form = snapshot(&model, set);
            println!("{}", dispatch::run_forward(model.table(), &model, &form)?);
            Ok(())
        }
    }
}

/// 지정되지 않은 필드는 빈 칸으로 두고, 선언되지 않은 이름은 경고만 남긴다.
fn snapshot(model: &DatasetModel, set: Vec<(String, String)>) -> FormSnapshot {
    let table = model.table();
    let mut form = FormSnapshot::blank(table);
    for (name, text) in set {
        if table.range(&name).is_none() {
            tracing::warn!(parameter = %name, "unknown parameter ignored");
            eprintln!("unknown parameter ignored: {name}");
            continue;
        }
        form.set(name, text);
    }
    form
}
