use tactics::error::{ActionError, Context, Error, ErrorKind, LoadError, Result};

// clear; cargo fmt; cargo test -- --nocapture
#[test]
fn show_error_messages() {
    let load_err = LoadError::ParseError("Invalid symbol".to_string());
    let err: Error = load_err.into();
    let err = err
        .context("解析第 5 行")
        .context("處理棋盤佈局")
        .context("載入關卡檔案");

    let error_str = err.to_string();
    println!("{}", error_str);

    // 驗證原始錯誤訊息
    assert!(error_str.contains("Invalid symbol"));

    // 驗證 contexts 與呼叫位置（路徑分隔符號依平台而異，只比對檔名與行號）
    assert!(error_str.contains("解析第 5 行 ["));
    assert!(error_str.contains("test_error.rs:9]"));
    assert!(error_str.contains("處理棋盤佈局 ["));
    assert!(error_str.contains("test_error.rs:10]"));
    assert!(error_str.contains("載入關卡檔案 ["));
    assert!(error_str.contains("test_error.rs:11]"));
}

#[test]
fn context_on_result() {
    fn reject() -> Result<()> {
        Err(ActionError::ActionInProgress.into())
    }

    let err = reject().context("玩家移動").unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Action(ActionError::ActionInProgress)
    ));
    let text = err.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].trim_start().starts_with("玩家移動 ["));
}
