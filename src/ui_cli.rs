use std::fmt::Display;
use std::io::{self, Write};

use crate::app::AppError;
use crate::dispatch::{self, FormSnapshot};
use crate::i18n::{keys, Translator};
use crate::metadata::ParameterTable;
use crate::predict::{ForwardPredictor, InversePredictor};
use crate::validation::{RangeWarning, WarningSink};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    RunInverse,
    RunForward,
    ShowRanges,
    Exit,
}

/// 범위 경고를 stderr로 출력한다.
pub struct ConsoleWarnings<'a> {
    tr: &'a Translator,
}

impl<'a> ConsoleWarnings<'a> {
    pub fn new(tr: &'a Translator) -> Self {
        Self { tr }
    }
}

impl WarningSink for ConsoleWarnings<'_> {
    fn warn(&mut self, warning: RangeWarning) {
        let (title, body) = self.tr.warning_text(&warning);
        eprintln!("[{title}] {body}");
    }
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu(tr: &Translator) -> Result<MenuChoice, AppError> {
    println!("{}", tr.t(keys::MAIN_MENU_TITLE));
    println!("{}", tr.t(keys::MAIN_MENU_RUN_INVERSE));
    println!("{}", tr.t(keys::MAIN_MENU_RUN_FORWARD));
    println!("{}", tr.t(keys::MAIN_MENU_RANGES));
    println!("{}", tr.t(keys::MAIN_MENU_EXIT));
    loop {
        let sel = read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::RunInverse),
            "2" => return Ok(MenuChoice::RunForward),
            "3" => return Ok(MenuChoice::ShowRanges),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

/// 제약/목표값을 입력받아 역방향 예측을 실행한다.
pub fn handle_inverse(
    tr: &Translator,
    table: &ParameterTable,
    predictor: &dyn InversePredictor,
) -> Result<(), AppError> {
    println!("\n-- {} --", tr.t(keys::CONSTRAINTS_HEADING));
    println!("{}", tr.t(keys::CONSTRAINTS_HINT));
    let mut form = read_fields(table, table.inputs())?;
    println!("\n-- {} --", tr.t(keys::DESIRED_HEADING));
    println!("{}", tr.t(keys::DESIRED_HINT));
    for (name, text) in read_fields(table, table.outputs())?.iter() {
        form.set(name, text);
    }
    let text = dispatch::run_inverse(table, predictor, &form, &mut ConsoleWarnings::new(tr))?;
    print_results(tr, &text);
    Ok(())
}

/// 모든 입력 파라미터를 입력받아 순방향 예측을 실행한다.
pub fn handle_forward(
    tr: &Translator,
    table: &ParameterTable,
    predictor: &dyn ForwardPredictor,
) -> Result<(), AppError> {
    println!("\n-- {} --", tr.t(keys::BUTTON_RUN_FORWARD));
    println!("{}", tr.t(keys::FORWARD_HINT));
    let form = read_fields(table, table.inputs())?;
    let text = dispatch::run_forward(table, predictor, &form)?;
    print_results(tr, &text);
    Ok(())
}

/// 파라미터별 유효 범위를 표시한다.
pub fn print_ranges(tr: &Translator, table: &ParameterTable) {
    println!("{}", tr.t(keys::RANGES_HEADING));
    println!("[{}]", tr.t(keys::CONSTRAINTS_HEADING));
    for name in table.inputs() {
        if let Some(label) = table.field_label(name) {
            println!("  {}", label.trim_end_matches([' ', ':']));
        }
    }
    println!("[{}]", tr.t(keys::DESIRED_HEADING));
    for name in table.outputs() {
        if let Some(label) = table.field_label(name) {
            println!("  {}", label.trim_end_matches([' ', ':']));
        }
    }
}

/// 동작을 중단시킨 오류를 번역된 접두어와 함께 한 줄로 만든다.
pub fn error_line(tr: &Translator, err: &dyn Display) -> String {
    format!("{}: {err}", tr.t(keys::ERROR_PREFIX))
}

pub fn print_results(tr: &Translator, text: &str) {
    println!("\n-- {} --", tr.t(keys::RESULTS_HEADING));
    println!("{text}");
}

/// `NAME=TEXT` 형식의 필드 지정값을 분리한다. TEXT는 비어 있어도 된다.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TEXT, got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in {s:?}"));
    }
    Ok((name.to_string(), text.trim().to_string()))
}

fn read_fields(table: &ParameterTable, names: &[String]) -> Result<FormSnapshot, AppError> {
    let mut form = FormSnapshot::new();
    for name in names {
        let label = table.field_label(name).unwrap_or_else(|| format!("{name} : "));
        let text = read_line(&label)?;
        form.set(name.clone(), text.trim());
    }
    Ok(form)
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("Orifice Size=100-200"),
            Ok(("Orifice Size".to_string(), "100-200".to_string()))
        );
        assert_eq!(
            parse_assignment(" Droplet Size = "),
            Ok(("Droplet Size".to_string(), String::new()))
        );
    }

    #[test]
    fn error_line_uses_translated_prefix() {
        let err = "model file missing";
        assert_eq!(
            error_line(&Translator::new("en-us"), &err),
            "Error: model file missing"
        );
        assert_eq!(
            error_line(&Translator::new("ko-kr"), &err),
            "오류: model file missing"
        );
    }

    #[test]
    fn assignment_requires_name_and_equals() {
        assert!(parse_assignment("100").is_err());
        assert!(parse_assignment("=5").is_err());
    }
}
