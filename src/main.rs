// ==========================================
// 零售销售数据导入 - 命令行入口
// ==========================================
// 用法:
//   sales-import <file> [db_path]             导入文件
//   sales-import --validate <file> [db_path]  仅校验，不落库
//   sales-import --history [db_path]          最近的导入历史
// 结果以 JSON 输出到 stdout；日志与进度输出到 stderr
// ==========================================

use anyhow::{bail, Context};
use sales_import::app::{get_default_db_path, AppState};
use sales_import::{logging, ImportProgress};

const USAGE: &str = "usage: sales-import <file> [db_path] | --validate <file> [db_path] | --history [db_path]";

enum Command {
    Import { file: String },
    Validate { file: String },
    History,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<(Command, Option<String>)> {
    let command = match args.next().as_deref() {
        Some("--history") => Command::History,
        Some("--validate") => Command::Validate {
            file: args.next().context(USAGE)?,
        },
        Some("-h") | Some("--help") | None => bail!(USAGE),
        Some(file) => Command::Import {
            file: file.to_string(),
        },
    };
    Ok((command, args.next()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let (command, db_path) = parse_args(std::env::args().skip(1))?;
    let db_path = db_path.unwrap_or_else(get_default_db_path);
    tracing::info!(version = sales_import::VERSION, db_path = %db_path, "{}", sales_import::APP_NAME);

    let state = AppState::new(db_path).context("failed to initialise application state")?;

    let output = match command {
        Command::Import { file } => {
            let mut last_step = String::new();
            let mut print_progress = |p: &ImportProgress| {
                if p.current_step != last_step {
                    eprintln!("[{:>3}%] {}", p.progress, p.current_step);
                    last_step = p.current_step.clone();
                }
            };
            let response = state
                .import_api
                .import_file_with_progress(&file, &mut print_progress)
                .await?;
            serde_json::to_string_pretty(&response)?
        }
        Command::Validate { file } => {
            let report = state.import_api.validate_file(&file).await?;
            serde_json::to_string_pretty(&report)?
        }
        Command::History => {
            let history = state.import_api.list_import_history().await?;
            serde_json::to_string_pretty(&history)?
        }
    };

    println!("{}", output);
    Ok(())
}
