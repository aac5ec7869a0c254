// ==========================================
// 销售数据导入端到端测试
// ==========================================
// 覆盖: 读取 → 校验 → 行处理 → 批量落库 → 导入历史
// ==========================================

use chrono::NaiveDate;
use sales_import::config::config_keys;
use sales_import::importer::SheetReadResult;
use sales_import::repository::{SalesImportRepository, SalesImportRepositoryImpl};
use sales_import::{
    import_rows, process_rows, read_sheet, validate, ApiError, AppState, CellValue, ImportOutcome,
    ImportProgress, ImportStage, SalesImporter, SourceFile, Supplier,
};

use test_helpers::*;

/// 单行合法数据：校验通过并处理为期望的记录
#[test]
fn test_valid_row_validates_and_processes() {
    let file = csv_source("sales.csv", &[sample_row("11/12/2024", "S100")]);

    let rows = read_sheet(&file).into_result().unwrap();
    assert_eq!(rows.len(), 2);

    let report = validate(&rows);
    assert!(report.is_valid, "unexpected errors: {:?}", report.errors);

    let processed = process_rows(&rows).unwrap();
    assert_eq!(processed.len(), 1);
    let record = &processed[0];
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 12, 11).unwrap());
    assert_eq!(record.branch_number, "5");
    assert_eq!(record.staff_code, "S100");
    assert_eq!(record.cellnet_quantity, 10.0);
    assert_eq!(record.cellnet_sales, 500.0);
    assert_eq!(record.cellnet_margin, 100.0);
    assert_eq!(record.likewize_acc_quantity, 0.0);
    assert_eq!(record.studiotech_margin, 0.0);
    assert_eq!(record.likewize_device_quantity, 20.0);
}

/// 不存在的日期：恰好一个 Date 列错误
#[test]
fn test_impossible_date_yields_single_error() {
    let rows = sheet(&[sample_row("31/04/2024", "S100")]);
    let report = validate(&rows);

    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 2);
    assert_eq!(report.errors[0].column.as_deref(), Some("Date"));
    assert_eq!(report.errors[0].value.as_deref(), Some("31/04/2024"));
}

/// 表头错误：只报表头，不做行校验
#[test]
fn test_header_mismatch_stops_before_rows() {
    let mut rows = sheet(&[sample_row("31/04/2024", "bad code!")]);
    rows[0][4] = "Cellnet Revenue".into();

    let report = validate(&rows);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 1);
    assert_eq!(report.errors[0].column.as_deref(), Some("Column 5"));
    assert!(report.errors[0].message.contains("Cellnet Sales"));
}

/// 行错误跨行累积
#[test]
fn test_row_errors_accumulate_across_rows() {
    let mut bad_numbers = sample_row("10/12/2024", "S2");
    bad_numbers[3] = "1.5".to_string();
    bad_numbers[4] = "5.555".to_string();
    let rows = sheet(&[
        sample_row("01/01/2024", "S1"),
        bad_numbers,
        sample_row("", ""),
    ]);

    let report = validate(&rows);
    let columns: Vec<(usize, Option<&str>)> = report
        .errors
        .iter()
        .map(|e| (e.row, e.column.as_deref()))
        .collect();
    assert_eq!(
        columns,
        vec![
            (3, Some("Cellnet Quantity")),
            (3, Some("Cellnet Sales")),
            (4, Some("Date")),
            (4, Some("Staff Code")),
        ]
    );
}

/// 读取失败返回 Failure 而不是 panic
#[test]
fn test_read_sheet_failure_is_reported() {
    let file = SourceFile::new("broken.xlsx", b"not a zip".to_vec());
    assert!(matches!(read_sheet(&file), SheetReadResult::Failure { .. }));
}

/// xlsx：数据行在第 16 列之后有多余单元格时，表头仍按 16 列校验
#[test]
fn test_xlsx_stray_cell_beyond_schema_keeps_header_width() {
    let bytes = xlsx_bytes_with(&[sample_row("11/12/2024", "S100")], 0, &[(1, 16, "checked")]).unwrap();
    let file = SourceFile::new("sales.xlsx", bytes);

    let rows = read_sheet(&file).into_result().unwrap();
    assert_eq!(rows[0].len(), 16);
    assert_eq!(rows[1].len(), 17);

    let report = validate(&rows);
    assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
    assert_eq!(process_rows(&rows).unwrap().len(), 1);
}

/// xlsx：表头上方的空行保留，行号与表格行号一致
#[test]
fn test_xlsx_leading_blank_rows_keep_row_numbers() {
    let bytes = xlsx_bytes_with(&[sample_row("11/12/2024", "S100")], 2, &[]).unwrap();
    let file = SourceFile::new("sales.xlsx", bytes);

    let rows = read_sheet(&file).into_result().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].is_empty() && rows[1].is_empty());
    assert_eq!(rows[2][0], CellValue::from("Date"));
    assert_eq!(rows[3][2], CellValue::from("S100"));

    // 首行不是表头
    let report = validate(&rows);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 1);
    assert!(report.errors[0].message.contains("found 0"));
}

/// 读取失败：返回错误并记录一条失败历史
#[tokio::test]
async fn test_unreadable_file_records_failed_history() {
    let (_db, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path.clone()).unwrap();
    let mut file = tempfile::Builder::new()
        .prefix("broken_")
        .suffix(".xlsx")
        .tempfile()
        .unwrap();
    std::io::Write::write_all(&mut file, b"not a zip").unwrap();

    let result = state
        .import_api
        .import_file(file.path().to_str().unwrap())
        .await;
    assert!(matches!(result, Err(ApiError::ImportError(_))));
    assert_eq!(count_metric_rows(&db_path).unwrap(), 0);

    let history = state.import_api.list_import_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0].success);
    assert_eq!(history[0].rows_processed, 0);
    assert!(history[0].file_name.starts_with("broken_"));
    assert!(history[0].error.is_some());
}

/// 校验未通过：不落库、不写历史
#[tokio::test]
async fn test_invalid_file_writes_nothing() {
    let (_db, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path.clone()).unwrap();
    let file = write_csv_file(&[
        sample_row("11/12/2024", "S100"),
        sample_row("31/04/2024", "S101"),
    ])
    .unwrap();

    let response = state
        .import_api
        .import_file(file.path().to_str().unwrap())
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].row, 3);
    assert_eq!(count_metric_rows(&db_path).unwrap(), 0);
    assert!(state.import_api.list_import_history().await.unwrap().is_empty());
}

/// 合法 CSV：5 条指标/行，共享批次 ID，成功历史
#[tokio::test]
async fn test_csv_import_commits_five_metrics_per_row() {
    let (_db, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path.clone()).unwrap();
    let file = write_csv_file(&[
        sample_row("11/12/2024", "S100"),
        sample_row("12/12/2024", "S101"),
        sample_row("13/12/2024", "S102"),
    ])
    .unwrap();

    let response = state
        .import_api
        .import_file(file.path().to_str().unwrap())
        .await
        .unwrap();
    assert!(response.success);
    assert_eq!(response.rows_processed, 3);
    assert_eq!(count_metric_rows(&db_path).unwrap(), 15);

    let batch_id = response.batch_id.unwrap();
    let metrics = state.import_repo.metrics_by_batch(&batch_id).unwrap();
    assert_eq!(metrics.len(), 15);
    assert_eq!(metrics[0].supplier, Supplier::Cellnet);
    assert_eq!(metrics[4].supplier, Supplier::LikewizeDevice);
    assert_eq!(metrics[4].quantity, 20.0);

    let history = state.import_api.list_import_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].success);
    assert_eq!(history[0].rows_processed, 3);
}

/// xlsx：数字单元格与文本日期都能导入
#[tokio::test]
async fn test_xlsx_import() {
    let (_db, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path.clone()).unwrap();
    let mut row = sample_row("09/10/2024", "AB-12");
    row[4] = "-30.25".to_string();
    let file = write_xlsx_file(&[row, sample_row("10/10/2024", "AB-13")]).unwrap();

    let response = state
        .import_api
        .import_file(file.path().to_str().unwrap())
        .await
        .unwrap();
    assert!(response.success, "unexpected errors: {:?}", response.errors);
    assert_eq!(response.rows_processed, 2);

    let metrics = state
        .import_repo
        .metrics_by_batch(response.batch_id.as_deref().unwrap())
        .unwrap();
    assert_eq!(metrics[0].staff_code, "AB-12");
    assert_eq!(metrics[0].sales, -30.25);
}

/// 进度：单调不减，终态 100%
#[tokio::test]
async fn test_progress_snapshots_are_monotonic() {
    let (_db, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    let rows: Vec<_> = (1..=9)
        .map(|d| sample_row(&format!("{:02}/11/2024", d), &format!("S{}", d)))
        .collect();
    let file = write_csv_file(&rows).unwrap();

    let mut snapshots: Vec<ImportProgress> = Vec::new();
    let mut sink = |p: &ImportProgress| snapshots.push(p.clone());
    state
        .import_api
        .import_file_with_progress(file.path().to_str().unwrap(), &mut sink)
        .await
        .unwrap();

    assert!(snapshots.windows(2).all(|w| w[0].progress <= w[1].progress));
    assert_eq!(snapshots.first().unwrap().progress, 0);
    let last = snapshots.last().unwrap();
    assert_eq!(last.progress, 100);
    assert_eq!(last.stage, ImportStage::Succeeded);
    assert_eq!(last.total_rows, 9);
}

/// 历史条数受配置限制，新的在前
#[tokio::test]
async fn test_history_limit_is_configurable() {
    let (_db, db_path) = create_test_db().unwrap();
    set_config(&db_path, config_keys::HISTORY_LIMIT, "3").unwrap();
    let state = AppState::new(db_path).unwrap();

    for i in 1..=4 {
        let file = write_csv_file(&vec![sample_row("01/02/2024", "S1"); i]).unwrap();
        state
            .import_api
            .import_file(file.path().to_str().unwrap())
            .await
            .unwrap();
    }

    let history = state.import_api.list_import_history().await.unwrap();
    assert_eq!(history.len(), 3);
    let rows: Vec<usize> = history.iter().map(|h| h.rows_processed).collect();
    assert_eq!(rows, vec![4, 3, 2]);
}

/// 参照日配置：晚于参照日的日期为未来日期
#[tokio::test]
async fn test_reference_date_pins_future_check() {
    let (_db, db_path) = create_test_db().unwrap();
    set_config(&db_path, config_keys::REFERENCE_DATE, "30/06/2024").unwrap();
    let state = AppState::new(db_path).unwrap();
    let file = write_csv_file(&[sample_row("01/07/2024", "S1")]).unwrap();

    let report = state
        .import_api
        .validate_file(file.path().to_str().unwrap())
        .await
        .unwrap();
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("future"));
}

/// 编排器直接调用：Invalid 结果携带错误列表
#[tokio::test]
async fn test_importer_returns_invalid_outcome() {
    let (_db, db_path) = create_test_db().unwrap();
    let repo = std::sync::Arc::new(SalesImportRepositoryImpl::new(&db_path).unwrap());
    let config = sales_import::config::ConfigManager::new(&db_path).unwrap();
    let importer = sales_import::SalesImporterImpl::new(repo.clone(), config);

    let file = csv_source("short.csv", &[]);
    let mut bytes = file.content.clone();
    bytes.extend_from_slice(b"\n11/12/2024,5");
    let file = SourceFile::new("short.csv", bytes);

    let mut sink = |_: &ImportProgress| {};
    let outcome = importer.import_file(&file, &mut sink).await.unwrap();
    match outcome {
        ImportOutcome::Invalid { errors } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].column.as_deref(), Some("Staff Code"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(repo.count_metrics().await.unwrap(), 0);
}

/// 单步落库入口：生成批次 ID 并回调进度
#[tokio::test]
async fn test_import_rows_entry_point() {
    let repo = SalesImportRepositoryImpl::new(":memory:").unwrap();
    let rows = process_rows(&sheet(&[
        sample_row("11/12/2024", "S100"),
        sample_row("12/12/2024", "S100"),
    ]))
    .unwrap();

    let mut fractions = Vec::new();
    let mut record = |f: f64| fractions.push(f);
    let (batch_id, committed) = import_rows(&repo, &rows, Some(&mut record)).await.unwrap();

    assert_eq!(committed, 10);
    assert_eq!(fractions, vec![0.5, 1.0]);
    assert_eq!(repo.metrics_by_batch(&batch_id).unwrap().len(), 10);
}
