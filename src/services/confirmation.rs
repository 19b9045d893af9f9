//! 人工确认 - 业务能力层
//!
//! 提交成功后需要操作人员在 CMS 中检查结果，确认后才会继续清理和处理下一个资料包。
//! 阻塞等待，没有超时。

use std::io::{self, BufRead, Write};

use anyhow::Result;
use async_trait::async_trait;
use console::Term;
use dialoguer::Input;
use tracing::warn;

/// 人工确认检查点
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> Result<()>;
}

/// 在终端等待操作人员按回车
///
/// stderr 不是终端时（输出被重定向、输入来自管道）退回到逐行读取 stdin
#[derive(Debug, Default)]
pub struct TerminalConfirmation;

#[async_trait]
impl Confirmation for TerminalConfirmation {
    async fn confirm(&self, prompt: &str) -> Result<()> {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            if Term::stderr().is_term() {
                Input::<String>::new()
                    .with_prompt(prompt)
                    .allow_empty(true)
                    .interact_text()?;
            } else {
                let stdin = io::stdin();
                read_confirmation(&mut stdin.lock(), &mut io::stderr(), &prompt)?;
            }
            Ok(())
        })
        .await??;
        Ok(())
    }
}

/// 打印提示并读取一行
///
/// 输入已结束（EOF）时没有人可以确认，记录警告后直接通过
fn read_confirmation<R, W>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{} ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        warn!("⚠️ 标准输入已结束，跳过人工确认");
    }
    Ok(())
}

/// 不等待，直接通过（无人值守或测试）
#[derive(Debug, Default)]
pub struct AutoConfirm;

#[async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> Result<()> {
        Ok(())
    }
}
