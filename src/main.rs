// ==========================================
// 扁平化 BOM 生成器 - 命令行入口
// ==========================================
// 用法:
//   flat-bom <part_id> [max_depth] [--db <path>] [--csv] [--json-log]
//
// 数据库路径默认取 FLAT_BOM_DB_PATH,其次为用户数据目录
// 结果写到 stdout(JSON 或 CSV),日志写到 stderr
// 告警语言取 FLAT_BOM_LOCALE(en / zh-CN)
// ==========================================

use anyhow::{bail, Context, Result};
use flat_bom_generator::api::{write_flat_bom_csv, FlatBomApi};
use flat_bom_generator::db::get_default_db_path;
use flat_bom_generator::{i18n, logging};

const USAGE: &str = "用法: flat-bom <part_id> [max_depth] [--db <path>] [--csv] [--json-log]";

#[derive(Debug, Default)]
struct CliArgs {
    part_id: i64,
    max_depth: Option<String>,
    db_path: Option<String>,
    csv: bool,
    json_log: bool,
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                parsed.db_path = Some(args.next().context("--db 需要一个路径参数")?);
            }
            "--csv" => parsed.csv = true,
            "--json-log" => parsed.json_log = true,
            "-h" | "--help" => bail!(USAGE),
            other if other.starts_with("--") => bail!("未知参数: {}\n{}", other, USAGE),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let part_id = positional.next().context(USAGE)?;
    parsed.part_id = part_id
        .trim()
        .parse()
        .with_context(|| format!("part_id 必须是整数: {}", part_id))?;
    parsed.max_depth = positional.next();

    if let Some(extra) = positional.next() {
        bail!("多余的参数: {}\n{}", extra, USAGE);
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    logging::init(args.json_log);
    i18n::init_from_env();

    let db_path = args.db_path.clone().unwrap_or_else(get_default_db_path);
    tracing::info!(
        version = flat_bom_generator::VERSION,
        db_path = %db_path,
        part_id = args.part_id,
        "{} 启动",
        flat_bom_generator::APP_NAME
    );

    let api = FlatBomApi::open(&db_path)?;
    let response = api
        .get_flat_bom(args.part_id, args.max_depth.as_deref())
        .await?;

    let stdout = std::io::stdout();
    if args.csv {
        write_flat_bom_csv(stdout.lock(), &response.bom_items)?;
    } else {
        serde_json::to_writer_pretty(stdout.lock(), &response)?;
        println!();
    }

    Ok(())
}
