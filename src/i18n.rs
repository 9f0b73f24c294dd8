use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

use crate::validation::{RangeWarning, WarningKind};

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const APP_TITLE: &str = "general.app_title";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_RUN_INVERSE: &str = "main_menu.run_inverse";
    pub const MAIN_MENU_RUN_FORWARD: &str = "main_menu.run_forward";
    pub const MAIN_MENU_RANGES: &str = "main_menu.ranges";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const CONSTRAINTS_HEADING: &str = "form.constraints_heading";
    pub const CONSTRAINTS_HINT: &str = "form.constraints_hint";
    pub const DESIRED_HEADING: &str = "form.desired_heading";
    pub const DESIRED_HINT: &str = "form.desired_hint";
    pub const FORWARD_HINT: &str = "form.forward_hint";
    pub const RANGES_HEADING: &str = "form.ranges_heading";

    pub const BUTTON_RUN_INVERSE: &str = "button.run_inverse";
    pub const BUTTON_RUN_FORWARD: &str = "button.run_forward";
    pub const RESULTS_HEADING: &str = "results.heading";

    pub const WARNING_CONSTRAINT_TITLE: &str = "warning.constraint_title";
    pub const WARNING_DESIRED_TITLE: &str = "warning.desired_title";
    pub const WARNING_TOO_LOW: &str = "warning.too_low";
    pub const WARNING_TOO_HIGH: &str = "warning.too_high";
    pub const WARNING_INVERTED: &str = "warning.inverted";
    pub const WARNING_OUT_OF_RANGE: &str = "warning.out_of_range";

    pub const MENU_FILE: &str = "gui.menu.file";
    pub const MENU_OPEN_MODEL: &str = "gui.menu.open_model";
    pub const MENU_BUILT_IN_MODEL: &str = "gui.menu.built_in_model";
    pub const MODEL_SOURCE: &str = "gui.model_source";
    pub const MODEL_BUILT_IN: &str = "gui.model_built_in";
    pub const MODEL_LOAD_ERROR: &str = "gui.model_load_error";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드에 따라 번역기를 생성한다. ko로 시작하지 않으면 en을 쓴다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 locales/ 를 찾고, 그래도 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    /// 번역을 가져온다. 언어팩 → 현재 언어 → 영어 순으로 찾는다.
    pub fn t(&self, key: &str) -> String {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return v.clone();
        }
        let text = match self.lang {
            Language::Ko => ko(key).or_else(|| en(key)),
            Language::En => en(key),
        };
        text.unwrap_or("[missing translation]").to_string()
    }

    /// `{name}` 형태의 자리표시자를 채운 번역.
    pub fn tf(&self, key: &str, vars: &[(&str, &str)]) -> String {
        fill_template(&self.t(key), vars)
    }

    /// 범위 경고를 (대화상자 제목, 본문)으로 만든다.
    pub fn warning_text(&self, warning: &RangeWarning) -> (String, String) {
        use keys::*;
        let (title, body) = match warning.kind {
            WarningKind::TooLow => (WARNING_CONSTRAINT_TITLE, WARNING_TOO_LOW),
            WarningKind::TooHigh => (WARNING_CONSTRAINT_TITLE, WARNING_TOO_HIGH),
            WarningKind::Inverted => (WARNING_CONSTRAINT_TITLE, WARNING_INVERTED),
            WarningKind::OutOfRange => (WARNING_DESIRED_TITLE, WARNING_OUT_OF_RANGE),
        };
        (
            self.t(title),
            self.tf(body, &[("name", warning.parameter.as_str())]),
        )
    }
}

fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        "ko" | "ko-kr" => Some("ko-kr".into()),
        "en" | "en-us" | "en-uk" => Some("en-us".into()),
        other if other.starts_with("ko") => Some("ko-kr".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko-kr".into()),
        "en" => Some("en-us".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LANG", "LC_ALL"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| normalize_locale_string(&v))
}

/// TOML 기반 언어팩을 로드한다. 중첩 테이블은 점으로 이은 키가 된다.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    let (base, _) = lang.split_once(['-', '_'])?;
    try_load(base)
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        APP_TITLE => "DAFD",
        MAIN_MENU_TITLE => "\n=== DAFD ===",
        MAIN_MENU_RUN_INVERSE => "1) DAFD 실행 (역방향 설계)",
        MAIN_MENU_RUN_FORWARD => "2) 순방향 모델 실행",
        MAIN_MENU_RANGES => "3) 파라미터 범위 보기",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        CONSTRAINTS_HEADING => "제약 조건",
        CONSTRAINTS_HINT => "값 x 또는 범위 x-y 입력, 비워 두면 제약 없음",
        DESIRED_HEADING => "목표값",
        DESIRED_HINT => "비워 둔 목표값은 무시됩니다",
        FORWARD_HINT => "모든 입력 파라미터 값이 필요합니다",
        RANGES_HEADING => "\n-- 파라미터 범위 --",
        BUTTON_RUN_INVERSE => "DAFD 실행",
        BUTTON_RUN_FORWARD => "순방향 모델 실행",
        RESULTS_HEADING => "결과",
        WARNING_CONSTRAINT_TITLE => "범위를 벗어난 제약",
        WARNING_DESIRED_TITLE => "범위를 벗어난 목표값",
        WARNING_TOO_LOW => "{name} 값이 너무 낮습니다. 제약을 무시합니다.",
        WARNING_TOO_HIGH => "{name} 값이 너무 높습니다. 제약을 무시합니다.",
        WARNING_INVERTED => "{name} 범위의 하한이 상한보다 큽니다. 제약을 무시합니다.",
        WARNING_OUT_OF_RANGE => "{name} 값이 범위를 벗어났습니다. 값을 무시합니다.",
        MENU_FILE => "파일",
        MENU_OPEN_MODEL => "모델 파일 열기…",
        MENU_BUILT_IN_MODEL => "내장 모델 사용",
        MODEL_SOURCE => "모델:",
        MODEL_BUILT_IN => "내장 데이터셋",
        MODEL_LOAD_ERROR => "모델을 불러오지 못했습니다",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting application.",
        APP_TITLE => "DAFD",
        MAIN_MENU_TITLE => "\n=== DAFD ===",
        MAIN_MENU_RUN_INVERSE => "1) Run DAFD (inverse design)",
        MAIN_MENU_RUN_FORWARD => "2) Run Forward Model",
        MAIN_MENU_RANGES => "3) Show parameter ranges",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please try again.",
        CONSTRAINTS_HEADING => "Constraints",
        CONSTRAINTS_HINT => "Enter a value x or a range x-y; leave blank for no constraint",
        DESIRED_HEADING => "Desired Values",
        DESIRED_HINT => "Blank desired values are ignored",
        FORWARD_HINT => "Every input parameter needs a value",
        RANGES_HEADING => "\n-- Parameter ranges --",
        BUTTON_RUN_INVERSE => "Run DAFD",
        BUTTON_RUN_FORWARD => "Run Forward Model",
        RESULTS_HEADING => "Results",
        WARNING_CONSTRAINT_TITLE => "Out of range constraint",
        WARNING_DESIRED_TITLE => "Out of range desired value",
        WARNING_TOO_LOW => "{name} was too low. Constraint ignored",
        WARNING_TOO_HIGH => "{name} was too high. Constraint ignored",
        WARNING_INVERTED => "{name} has its low bound above its high bound. Constraint ignored",
        WARNING_OUT_OF_RANGE => "{name} was out of range. Value was ignored",
        MENU_FILE => "File",
        MENU_OPEN_MODEL => "Open model file…",
        MENU_BUILT_IN_MODEL => "Use built-in model",
        MODEL_SOURCE => "Model:",
        MODEL_BUILT_IN => "built-in dataset",
        MODEL_LOAD_ERROR => "Could not load model",
        _ => return None,
    })
}
