// ==========================================
// WorkItemImporter 集成测试
// ==========================================
// 测试目标: 验证从表格字节到创建记录预览的完整流程
// ==========================================


use std::sync::atomic::Ordering;
use test_helpers::{
    csv_bytes, name_only_schema, sample_schema, sample_users, xlsx_bytes, CountingUserDirectory,
    FailingUserDirectory, MockConfig, XCell,
};
use work_item_import::client::{StaticUserDirectory, UserDirectory};
use work_item_import::domain::{FieldValue, FieldValuePair, ImportPreview, OptionRef};
use work_item_import::importer::{ImportError, WorkItemImporter, WorkItemImporterImpl};
use work_item_import::logging;

/// 创建测试用的导入管道
fn create_test_importer<U: UserDirectory>(
    users: U,
    config: MockConfig,
) -> WorkItemImporterImpl<U, MockConfig> {
    WorkItemImporterImpl::with_default_components(users, config)
}

async fn preview_csv(headers: &[&str], rows: &[Vec<&str>]) -> ImportPreview {
    create_test_importer(sample_users(), MockConfig::default())
        .preview("cases.csv", &csv_bytes(headers, rows), &sample_schema())
        .await
        .expect("预览失败")
}

fn messages(preview: &ImportPreview, header: &str) -> Vec<String> {
    preview
        .report
        .get(header)
        .map(|c| c.messages.clone())
        .unwrap_or_default()
}

// ==========================================
// 记录数上限
// ==========================================

#[tokio::test]
async fn test_over_limit_keeps_first_thousand_records() {
    logging::init_test();

    let names: Vec<String> = (1..=1500).map(|i| format!("用例{}", i)).collect();
    let rows: Vec<Vec<&str>> = names.iter().map(|n| vec![n.as_str()]).collect();

    let preview = preview_csv(&["名称"], &rows).await;

    assert!(preview.is_over_limit);
    assert_eq!(preview.records.len(), 1000);
    assert_eq!(preview.source_rows.len(), 1500);
    assert_eq!(preview.records[0].name, "用例1");
    assert_eq!(preview.records[999].name, "用例1000");
}

#[tokio::test]
async fn test_exactly_limit_is_not_over() {
    logging::init_test();

    let config = MockConfig {
        record_limit: 3,
        ..MockConfig::default()
    };
    let bytes = csv_bytes(&["名称"], &[vec!["a"], vec!["b"], vec!["c"]]);

    let preview = create_test_importer(sample_users(), config)
        .preview("cases.csv", &bytes, &sample_schema())
        .await
        .unwrap();

    assert!(!preview.is_over_limit);
    assert_eq!(preview.records.len(), 3);
}

// ==========================================
// 复合字段多行合并
// ==========================================

#[tokio::test]
async fn test_continuation_rows_merge_into_compound_field() {
    logging::init_test();

    let preview = preview_csv(
        &["名称", "步骤", "预期结果", "优先级"],
        &[
            vec!["用例1", "打开应用", "进入首页", "A"],
            vec!["", "点击登录", "弹出登录框", "B"],
            vec!["", "输入密码", "登录成功", ""],
            vec!["用例2", "退出", "回到首页", ""],
        ],
    )
    .await;

    assert_eq!(preview.records.len(), 2);

    let first = &preview.records[0];
    assert_eq!(first.name, "用例1");
    assert_eq!(first.row_number, 2);

    let steps = &first.field("case_steps").expect("缺少复合字段").field_value;
    let FieldValue::Compound(groups) = steps else {
        panic!("复合字段编码错误: {:?}", steps);
    };
    assert_eq!(groups.len(), 3);
    assert_eq!(
        groups[1],
        vec![
            FieldValuePair::new("step", FieldValue::Text("点击登录".to_string())),
            FieldValuePair::new("expected", FieldValue::Text("弹出登录框".to_string())),
        ]
    );

    // 续行的非复合字段不覆盖主行
    assert_eq!(
        first.field("priority").unwrap().field_value,
        FieldValue::Option(OptionRef::new("A", "1"))
    );

    let second = &preview.records[1];
    assert_eq!(second.row_number, 5);
    let FieldValue::Compound(groups) = &second.field("case_steps").unwrap().field_value else {
        panic!("复合字段编码错误");
    };
    assert_eq!(groups.len(), 1);
}

#[tokio::test]
async fn test_leading_continuation_rows_are_dropped() {
    logging::init_test();

    let preview = preview_csv(
        &["名称", "步骤"],
        &[vec!["", "孤立步骤"], vec!["用例1", "打开应用"]],
    )
    .await;

    assert_eq!(preview.records.len(), 1);
    let FieldValue::Compound(groups) = &preview.records[0].field("case_steps").unwrap().field_value
    else {
        panic!("复合字段编码错误");
    };
    assert_eq!(groups.len(), 1);
}

// ==========================================
// 单元格校验 + 编码
// ==========================================

#[tokio::test]
async fn test_single_select_with_multiple_tokens() {
    logging::init_test();

    let preview = preview_csv(&["名称", "优先级"], &[vec!["用例1", "A|B"]]).await;

    let column = preview.report.get("优先级").unwrap();
    assert_eq!(column.messages, vec!["仅支持单选".to_string()]);
    assert!(column.invalid_option);
    assert!(preview.has_errors());

    // 仍保留第一个可解析的选项
    assert_eq!(
        preview.records[0].field("priority").unwrap().field_value,
        FieldValue::Option(OptionRef::new("A", "1"))
    );
}

#[tokio::test]
async fn test_multi_select_keeps_cell_order() {
    logging::init_test();

    let preview = preview_csv(&["名称", "标签"], &[vec!["用例1", "B | A"]]).await;

    assert!(!preview.has_errors());
    assert_eq!(
        preview.records[0].field("tags").unwrap().field_value,
        FieldValue::OptionList(vec![OptionRef::new("B", "2"), OptionRef::new("A", "1")])
    );
}

#[tokio::test]
async fn test_unknown_options_reported_per_row() {
    logging::init_test();

    let preview = preview_csv(
        &["名称", "标签", "关联需求"],
        &[vec!["用例1", "A|X", "abc"], vec!["用例2", "Y", "12"]],
    )
    .await;

    assert_eq!(
        messages(&preview, "标签"),
        vec!["选项不存在: X".to_string(), "选项不存在: Y".to_string()]
    );
    assert_eq!(messages(&preview, "关联需求"), vec!["请输入数字".to_string()]);
    assert_eq!(
        preview.report.error_columns(),
        vec!["标签".to_string(), "关联需求".to_string()]
    );
    assert_eq!(
        preview.records[1].field("related").unwrap().field_value,
        FieldValue::Integer(12)
    );
}

#[tokio::test]
async fn test_header_level_errors() {
    logging::init_test();

    let preview = preview_csv(
        &["名称", "不存在的列", "创建者", "分值"],
        &[vec!["用例1", "x", "alice@example.com", "3"]],
    )
    .await;

    assert_eq!(messages(&preview, "不存在的列"), vec!["字段不存在".to_string()]);
    assert_eq!(messages(&preview, "创建者"), vec!["系统字段不支持".to_string()]);
    assert_eq!(messages(&preview, "分值"), vec!["该字段类型不支持".to_string()]);

    // 不可导入的列不进入创建记录
    let record = &preview.records[0];
    assert!(record.field("owner").is_none());
    assert!(record.field("score").is_none());
}

#[tokio::test]
async fn test_duplicate_schema_names_are_flagged_not_blocking() {
    logging::init_test();

    let preview = preview_csv(&["名称", "描述"], &[vec!["用例1", "一段描述"]]).await;

    assert_eq!(preview.duplicate_headers, vec!["描述".to_string()]);
    assert!(preview.report.get("描述").unwrap().duplicate_header);
    assert!(!preview.has_errors());
}

#[tokio::test]
async fn test_user_and_tree_fields_resolve() {
    logging::init_test();

    let preview = preview_csv(
        &["名称", "测试负责人", "开发人员", "模块"],
        &[vec![
            "用例1",
            "alice@example.com|bob@example.com",
            "bob@example.com|nobody@example.com|alice@example.com",
            "客户端/iOS",
        ]],
    )
    .await;

    let record = &preview.records[0];
    assert_eq!(
        record.field("qa").unwrap().field_value,
        FieldValue::Text("u_alice".to_string())
    );
    assert_eq!(
        record.field("devs").unwrap().field_value,
        FieldValue::TextList(vec!["u_bob".to_string(), "u_alice".to_string()])
    );
    assert_eq!(
        record.field("module").unwrap().field_value,
        FieldValue::Text("client_ios".to_string())
    );
}

// ==========================================
// 模板
// ==========================================

#[tokio::test]
async fn test_template_column_and_schema_fallback() {
    logging::init_test();

    let preview = preview_csv(
        &["名称", "模板"],
        &[vec!["用例1", "性能用例"], vec!["用例2", ""]],
    )
    .await;

    assert_eq!(preview.records[0].template_id, Some(102));
    assert_eq!(preview.records[1].template_id, Some(101));
    assert!(preview.records[0].field("template").is_none());
}

#[tokio::test]
async fn test_schema_without_templates_leaves_template_empty() {
    logging::init_test();

    let preview = create_test_importer(sample_users(), MockConfig::default())
        .preview("cases.csv", &csv_bytes(&["名称"], &[vec!["用例1"]]), &name_only_schema())
        .await
        .unwrap();

    assert_eq!(preview.records[0].template_id, None);
}

// ==========================================
// 文件格式与边界
// ==========================================

#[tokio::test]
async fn test_xlsx_workbook_end_to_end() {
    logging::init_test();

    let bytes = xlsx_bytes(
        &["名称", "关联需求", "关联缺陷", "测试负责人", "步骤"],
        &[
            vec![
                XCell::Text("用例1"),
                XCell::Number(42.0),
                XCell::Text("7|8"),
                XCell::Text("alice@example.com"),
                XCell::Text("打开应用"),
            ],
            vec![
                XCell::Blank,
                XCell::Blank,
                XCell::Blank,
                XCell::Blank,
                XCell::Text("点击登录"),
            ],
        ],
    )
    .expect("生成 xlsx 失败");

    let preview = create_test_importer(sample_users(), MockConfig::default())
        .preview("cases.xlsx", &bytes, &sample_schema())
        .await
        .unwrap();

    assert!(!preview.has_errors());
    assert_eq!(preview.records.len(), 1);
    let record = &preview.records[0];
    assert_eq!(
        record.field("related").unwrap().field_value,
        FieldValue::Integer(42)
    );
    assert_eq!(
        record.field("related_bugs").unwrap().field_value,
        FieldValue::IntegerList(vec![7, 8])
    );
    assert_eq!(preview.source_rows[1].row_number, 3);
}

#[tokio::test]
async fn test_header_only_sheet_is_rejected() {
    logging::init_test();

    let result = create_test_importer(sample_users(), MockConfig::default())
        .preview("cases.csv", &csv_bytes(&["名称", "优先级"], &[]), &sample_schema())
        .await;

    assert!(matches!(result, Err(ImportError::EmptyWorkbook)));
}

#[tokio::test]
async fn test_unsupported_extension() {
    logging::init_test();

    let result = create_test_importer(sample_users(), MockConfig::default())
        .preview("cases.txt", b"name\n1\n", &sample_schema())
        .await;

    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_missing_name_column_reported() {
    logging::init_test();

    let preview = preview_csv(&["优先级"], &[vec!["A"]]).await;

    assert!(!preview.is_name_field_exist);
    assert_eq!(preview.name_field, "名称");
    assert!(preview.records.is_empty());
}

// ==========================================
// 运行隔离 / 外部协作方
// ==========================================

#[tokio::test]
async fn test_each_run_builds_fresh_context() {
    logging::init_test();

    let users = CountingUserDirectory::new(sample_users());
    let calls = users.counter();
    let importer = create_test_importer(users, MockConfig::default());
    let bytes = csv_bytes(&["名称", "测试负责人"], &[vec!["用例1", "alice@example.com"]]);

    let first = importer.preview("cases.csv", &bytes, &sample_schema()).await.unwrap();
    let second = importer
        .preview("cases.csv", &bytes, &name_only_schema())
        .await
        .unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "第二次运行无用户列,不应查询");
    // 第二次运行的 Schema 不含该列
    assert_eq!(messages(&second, "测试负责人"), vec!["字段不存在".to_string()]);
    assert!(messages(&first, "测试负责人").is_empty());
}

#[tokio::test]
async fn test_user_lookup_failure_is_fatal() {
    logging::init_test();

    let result = create_test_importer(FailingUserDirectory, MockConfig::default())
        .preview(
            "cases.csv",
            &csv_bytes(&["名称", "开发人员"], &[vec!["用例1", "alice@example.com"]]),
            &sample_schema(),
        )
        .await;

    assert!(matches!(result, Err(ImportError::UserLookupFailed(_))));
}

#[tokio::test]
async fn test_unmatched_emails_resolve_to_empty() {
    logging::init_test();

    let preview = create_test_importer(StaticUserDirectory::default(), MockConfig::default())
        .preview(
            "cases.csv",
            &csv_bytes(&["名称", "测试负责人"], &[vec!["用例1", "ghost@example.com"]]),
            &sample_schema(),
        )
        .await
        .unwrap();

    assert_eq!(preview.records[0].field("qa").unwrap().field_value, FieldValue::Empty);
}

#[tokio::test]
async fn test_messages_follow_configured_locale() {
    logging::init_test();

    let preview = create_test_importer(sample_users(), MockConfig::with_locale("en"))
        .preview(
            "cases.csv",
            &csv_bytes(&["名称", "优先级", "未知"], &[vec!["用例1", "Z", "x"]]),
            &sample_schema(),
        )
        .await
        .unwrap();

    assert_eq!(messages(&preview, "未知"), vec!["Field does not exist".to_string()]);
    assert_eq!(
        messages(&preview, "优先级"),
        vec!["Option does not exist: Z".to_string()]
    );
}
