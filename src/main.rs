// ==========================================
// 医院寄售库存优化 - 命令行入口
// ==========================================
// 用法:
//   consignment-optimizer <input.csv|xlsx> [--as-of YYYY-MM-DD[ HH:MM:SS]]
//       [--config PATH] [--output PATH] [--format csv|json]
//       [--hospital NAME]... [--category NAME]... [--product NAME]...
//       [--pivot category|product] [--pivot-value difference|recommended|current_stock]
//
// 环境变量:
//   CONSIGNMENT_CONFIG     配置文件路径（--config 优先）
//   CONSIGNMENT_LOG_FORMAT json 时输出 JSON 行日志
//   RUST_LOG               日志级别
// ==========================================

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, ValueEnum};
use consignment_optimizer::engine::{category_hospital_pivot, product_hospital_pivot};
use consignment_optimizer::export::{self, ExportFormat};
use consignment_optimizer::{
    logging, DatasetLoader, EngineConfig, PivotValue, RecommendationEngine, RecordFilter,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

// ==========================================
// 命令行参数
// ==========================================

#[derive(Parser, Debug)]
#[command(name = "consignment-optimizer")]
#[command(about = "医院寄售库存补货建议")]
#[command(version)]
struct Args {
    /// 输入文件（.csv / .xlsx / .xls）
    input: PathBuf,

    /// 计算时间点,缺省为当前本地时间
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<NaiveDateTime>,

    /// 引擎配置文件（JSON）
    #[arg(long, env = "CONSIGNMENT_CONFIG")]
    config: Option<PathBuf>,

    /// 输出文件,缺省写到标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 输出格式（结果表与透视表均适用）
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,

    /// 医院名称筛选（可重复）
    #[arg(long = "hospital")]
    hospitals: Vec<String>,

    /// 产品类别筛选（可重复）
    #[arg(long = "category")]
    categories: Vec<String>,

    /// 产品名称筛选（可重复）
    #[arg(long = "product")]
    products: Vec<String>,

    /// 输出透视表而非结果表
    #[arg(long, value_enum)]
    pivot: Option<PivotKind>,

    /// 产品 × 医院透视的取值
    #[arg(long, value_enum, default_value_t = PivotValueArg::Difference)]
    pivot_value: PivotValueArg,

    /// 日志格式
    #[arg(long, value_enum, env = "CONSIGNMENT_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PivotKind {
    Category,
    Product,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PivotValueArg {
    Difference,
    Recommended,
    #[value(name = "current_stock")]
    CurrentStock,
}

impl From<PivotValueArg> for PivotValue {
    fn from(arg: PivotValueArg) -> Self {
        match arg {
            PivotValueArg::Difference => PivotValue::Difference,
            PivotValueArg::Recommended => PivotValue::Recommended,
            PivotValueArg::CurrentStock => PivotValue::CurrentStock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Args {
    fn filter(&self) -> RecordFilter {
        RecordFilter {
            hospitals: self.hospitals.clone(),
            categories: self.categories.clone(),
            products: self.products.clone(),
        }
    }
}

/// 支持 "YYYY-MM-DD"（零点）与 "YYYY-MM-DD HH:MM:SS"
fn parse_as_of(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").or_else(|_| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
    })
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    match &args.config {
        Some(path) => {
            info!(path = %path.display(), "加载引擎配置");
            EngineConfig::from_json_file(path)
                .with_context(|| format!("配置加载失败: {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.log_format {
        LogFormat::Json => logging::init_json(),
        LogFormat::Text => logging::init(),
    }

    let config = load_config(&args)?;
    let as_of = args.as_of.unwrap_or_else(|| Local::now().naive_local());
    let format = ExportFormat::from(args.format);

    info!(
        version = consignment_optimizer::VERSION,
        input = %args.input.display(),
        as_of = %as_of,
        "{} 启动",
        consignment_optimizer::APP_NAME
    );

    let dataset = DatasetLoader::new(config.duplicate_policy)
        .load_file(&args.input)
        .with_context(|| format!("数据集加载失败: {}", args.input.display()))?;
    for issue in &dataset.issues {
        warn!(%issue, "数据问题");
    }

    let report = RecommendationEngine::new(config).run(&dataset, as_of, &args.filter());
    info!(summary = ?report.summary, "关键指标");

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("无法创建输出文件: {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match args.pivot {
        Some(PivotKind::Category) => {
            export::write_pivot(&category_hospital_pivot(&report.rows), writer, format)?
        }
        Some(PivotKind::Product) => export::write_pivot(
            &product_hospital_pivot(&report.rows, args.pivot_value.into()),
            writer,
            format,
        )?,
        None => match format {
            ExportFormat::Csv => export::write_rows_csv(&report.rows, writer)?,
            ExportFormat::Json => export::write_report_json(&report, writer)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_full_args() {
        let args = Args::try_parse_from([
            "consignment-optimizer",
            "data.csv",
            "--as-of",
            "2025-06-30",
            "--format",
            "json",
            "--hospital",
            "General",
            "--hospital",
            "County",
            "--pivot",
            "product",
            "--pivot-value",
            "current_stock",
        ])
        .unwrap();

        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(
            args.as_of,
            NaiveDate::from_ymd_opt(2025, 6, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(ExportFormat::from(args.format), ExportFormat::Json);
        assert_eq!(args.filter().hospitals, vec!["General", "County"]);
        assert_eq!(args.pivot, Some(PivotKind::Product));
        assert_eq!(PivotValue::from(args.pivot_value), PivotValue::CurrentStock);
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["consignment-optimizer", "data.csv"]).unwrap();
        assert_eq!(args.format, FormatArg::Csv);
        assert_eq!(args.pivot, None);
        assert_eq!(args.pivot_value, PivotValueArg::Difference);
        assert!(args.filter().is_empty());
    }

    #[test]
    fn test_parse_requires_input() {
        assert!(Args::try_parse_from(["consignment-optimizer", "--format", "csv"]).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        assert!(Args::try_parse_from(["consignment-optimizer", "data.csv", "--verbose"]).is_err());
        assert!(Args::try_parse_from(["consignment-optimizer", "data.csv", "--format", "xml"]).is_err());
        assert!(Args::try_parse_from(["consignment-optimizer", "data.csv", "--as-of", "30/06/2025"]).is_err());
    }

    #[test]
    fn test_parse_as_of_with_time() {
        let dt = parse_as_of("2025-06-30 08:15:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "08:15");
        assert!(parse_as_of("30/06/2025").is_err());
    }
}
