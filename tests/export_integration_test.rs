use anyhow::Result;
use calamine::{open_workbook, Data, Reader, Xlsx};
use httpmock::prelude::*;
use httpmock::Mock;
use std::path::Path;
use tempfile::TempDir;
use xk_export::domain::model::{CrawlFailure, Major, NodeKind};
use xk_export::{EtlEngine, EtlError, HttpFetcher, LocalStorage, TomlConfig, XkPipeline};

const XLSX_FILE: &str = "2024年普通高校招生专业选考科目要求.xlsx";
const CSV_FILE: &str = "2024年普通高校招生专业选考科目要求.csv";

fn moe_page(names: &[&str]) -> String {
    let cells: String = names
        .iter()
        .map(|name| {
            format!(
                "<td width=\"120\" valign=\"top\"><p class=\"MsoNormal\"><span lang=\"EN-US\">{}</span></p></td>\n",
                name
            )
        })
        .collect();
    format!(
        "<html><body><table class=\"MsoNormalTable\" border=\"0\"><tr>\n{}</tr></table></body></html>",
        cells
    )
}

fn entry_page() -> String {
    "<html><table class=\"linner\" width=\"100%\"><tr><td>\n\
     <a href='area_33.html' class=\"p\">浙江</a>\n\
     </td></tr></table></html>"
        .to_string()
}

fn province_page() -> String {
    let row = |code: &str, name: &str| {
        format!(
            "<tr class=\"r\">\n<td>浙江</td>\n<td>{}</td>\n<td>{}</td>\n<td><a href=\"sch_{}.html\" target=\"_blank\" >查看</a></td>\n</tr>\n",
            code, name, code
        )
    };
    format!(
        "<table class=\"lsch\">\n<tr><th>地区</th><th>代码</th><th>名称</th><th>链接</th></tr>\n{}{}</table>",
        row("10335", "浙江大学"),
        row("11646", "宁波大学")
    )
}

fn school_page(rows: &[[&str; 4]]) -> String {
    let header = ["层次", "专业（类）名称", "选考科目要求", "类中所含专业"];
    let body: String = std::iter::once(&header)
        .chain(rows.iter())
        .map(|cells| {
            format!(
                "<tr class=\"m\"><td class=\"c\">{}</td>\n<td class=\"c\">{}</td>\n<td class=\"c\">{}</td>\n<td class=\"c\">{}</td></tr>\n",
                cells[0], cells[1], cells[2], cells[3]
            )
        })
        .collect();
    format!("<table width=\"100%\" class=\"lgoto\" border=\"1\">\n{}</table>", body)
}

struct Site<'a> {
    entry: Mock<'a>,
    moe_985: Mock<'a>,
    schools: Vec<Mock<'a>>,
}

fn mount_site(server: &MockServer, ningbo_status: u16) -> Site<'_> {
    let entry = server.mock(|when, then| {
        when.method(GET).path("/xk2024/");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(entry_page());
    });
    server.mock(|when, then| {
        when.method(GET).path("/xk2024/area_33.html");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(province_page());
    });
    let zju = server.mock(|when, then| {
        when.method(GET).path("/xk2024/sch_10335.html");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(school_page(&[
                ["本科", "哲学类", "不限", "哲学、宗教学"],
                ["本科", "计算机类", "物理", "计算机科学与技术、软件工程"],
            ]));
    });
    let nbu = server.mock(|when, then| {
        when.method(GET).path("/xk2024/sch_11646.html");
        then.status(ningbo_status)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(school_page(&[["本科", "力学类", "物理+化学", "理论与应用力学"]]));
    });
    let moe_985 = server.mock(|when, then| {
        when.method(GET).path("/moe/985.html");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(moe_page(&["浙江大学", "清华大学"]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/moe/211.html");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(moe_page(&["浙江大学", "宁波大学"]));
    });

    Site {
        entry,
        moe_985,
        schools: vec![zju, nbu],
    }
}

fn config_for(server: &MockServer, extra: &str) -> TomlConfig {
    let toml_content = format!(
        r#"
[sources]
entry_url = "{origin}"
origin = "{origin}"
moe_985_url = "{base}/moe/985.html"
moe_211_url = "{base}/moe/211.html"
discipline_url = "{base}/wiki/list"
proxy_url = "{base}"
timeout_seconds = 5

{extra}
"#,
        origin = server.url("/xk2024/"),
        base = server.base_url(),
        extra = extra
    );
    TomlConfig::from_toml_str(&toml_content).unwrap()
}

/// 學科名單來自境外來源，測試中預先放入快取
fn workspace() -> Result<TempDir> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("levelmajors.json"),
        r#"[{"SchoolName":"浙江大学","Majors":["哲学","化学"]}]"#,
    )?;
    Ok(dir)
}

async fn run(dir: &TempDir, config: TomlConfig) -> xk_export::Result<String> {
    let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
    let fetcher = HttpFetcher::new(&config.sources)?;
    let pipeline = XkPipeline::new(storage, fetcher, config);
    EtlEngine::new(pipeline).run().await
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.to_string(),
        _ => cell.to_string(),
    }
}

fn read_sheet(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_export_end_to_end() -> Result<()> {
    let server = MockServer::start();
    let site = mount_site(&server, 200);
    let dir = workspace()?;

    run(&dir, config_for(&server, "")).await?;

    site.entry.assert_hits(1);
    site.schools[0].assert_hits(1);
    site.schools[1].assert_hits(1);

    let table = read_sheet(&dir.path().join(XLSX_FILE));
    assert_eq!(table.len(), 4);
    assert_eq!(
        table[0],
        vec![
            "省份",
            "院校名称",
            "院校类型",
            "专业特点",
            "专业（类）名称",
            "类中所含专业",
            "层次",
            "选科科目要求"
        ]
    );
    assert_eq!(
        table[1],
        vec![
            "浙江",
            "浙江大学",
            "985、211、一流大学",
            "一流学科-哲学",
            "哲学类",
            "哲学、宗教学",
            "本科",
            "不限"
        ]
    );
    assert_eq!(table[2][3], "");
    assert_eq!(table[2][4], "计算机类");
    assert_eq!(table[3][1], "宁波大学");
    assert_eq!(table[3][2], "211、一流学科建设高校");
    assert_eq!(table[3][7], "物理+化学");

    let cached: Vec<Major> =
        serde_json::from_slice(&std::fs::read(dir.path().join("majors.json"))?)?;
    assert_eq!(cached.len(), 3);
    assert_eq!(cached[2].school_name, "宁波大学");
    assert!(dir.path().join("985.json").is_file());
    assert!(dir.path().join("211.json").is_file());
    assert!(!dir.path().join("crawl_failures.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_second_run_reads_caches() -> Result<()> {
    let server = MockServer::start();
    let site = mount_site(&server, 200);
    let dir = workspace()?;

    run(&dir, config_for(&server, "")).await?;
    std::fs::remove_file(dir.path().join(XLSX_FILE))?;
    run(&dir, config_for(&server, "")).await?;

    site.entry.assert_hits(1);
    site.moe_985.assert_hits(1);
    site.schools[0].assert_hits(1);
    assert_eq!(read_sheet(&dir.path().join(XLSX_FILE)).len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_refresh_crawls_again() -> Result<()> {
    let server = MockServer::start();
    let site = mount_site(&server, 200);
    let dir = workspace()?;

    run(&dir, config_for(&server, "")).await?;
    run(&dir, config_for(&server, "[cache]\nrefresh = true")).await.unwrap_err();

    // refresh 也會重新抓取學科名單，模擬站台沒有該頁面
    site.moe_985.assert_hits(2);
    site.entry.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_failed_school_is_reported() -> Result<()> {
    let server = MockServer::start();
    let site = mount_site(&server, 500);
    let dir = workspace()?;

    run(&dir, config_for(&server, "")).await?;

    site.schools[1].assert_hits(1);
    let table = read_sheet(&dir.path().join(XLSX_FILE));
    assert_eq!(table.len(), 3);
    assert!(table.iter().all(|row| row[1] != "宁波大学"));

    let report = std::fs::read(dir.path().join("crawl_failures.json"))?;
    let failures: Vec<CrawlFailure> = serde_json::from_slice(&report)?;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, NodeKind::School);
    assert_eq!(failures[0].name, "宁波大学");
    assert!(failures[0].url.ends_with("/xk2024/sch_11646.html"));
    assert!(failures[0].reason.contains("500"));

    // 不完整的爬取結果不寫入快取
    assert!(!dir.path().join("majors.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_fail_fast_aborts_without_output() -> Result<()> {
    let server = MockServer::start();
    mount_site(&server, 500);
    let dir = workspace()?;

    let err = run(&dir, config_for(&server, "[crawl]\nfail_fast = true"))
        .await
        .unwrap_err();

    assert!(matches!(err, EtlError::NetworkError { .. }));
    assert!(!dir.path().join(XLSX_FILE).exists());
    Ok(())
}

#[tokio::test]
async fn test_csv_output() -> Result<()> {
    let server = MockServer::start();
    mount_site(&server, 200);
    let dir = workspace()?;

    let extra = r#"
[load]
output_path = "export"
output_formats = ["csv"]
"#;
    let output = run(&dir, config_for(&server, extra)).await?;

    assert!(output.ends_with(CSV_FILE));
    assert!(!dir.path().join("export").join(XLSX_FILE).exists());
    let text = std::fs::read_to_string(dir.path().join("export").join(CSV_FILE))?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "浙江,浙江大学,985、211、一流大学,一流学科-哲学,哲学类,哲学、宗教学,本科,不限"
    );
    Ok(())
}
