use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FIRST_EXPORT: &str = "\
Doc Date,PI,Your Ref.,Debtor Name,Item Code,Further Description,Detail Description 2,Qty
2024-01-15,P001,PO-1,Acme,ABC-100-X,\"Colour: Red
Size: L\",Frame (F),2
2024-01-16,P002,PO-2,Beta,U77,\"Colour: Blue
REMARK DELIVERY: gate 4\",,1
,,,,,,,
";

const SECOND_EXPORT: &str = "\
PI,Debtor Name,Item Code
P001,Acme Ltd,ABC-100-X
P003,Gamma,Y55-01
";

const REFERENCE: &str = "\
Item Code,Model
ABC-100-X,Alpha
U77-200,Custom U
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();
        fs::write(dir.path().join("first.csv"), FIRST_EXPORT).unwrap();
        fs::write(dir.path().join("second.csv"), SECOND_EXPORT).unwrap();
        fs::write(dir.path().join("reference.csv"), REFERENCE).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ordex").unwrap();
        cmd.arg("--config").arg(self.path("config.json"));
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_single_file_csv() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["process", arg(&fx.path("first.csv"))])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "TIMESTAMP,PI NUMBER,PO NUMBER,ORDER,TYPE,QTY,DETAIL 1,FAB 1",
        ))
        .stdout(predicate::str::contains("FIXED PART"))
        .stdout(predicate::str::contains("CUSTOMADE"))
        .stdout(predicate::str::contains("2024-01-15 00:00:00"))
        .stdout(predicate::str::contains("MODEL").not())
        .stderr(predicate::str::contains("Dropped 1 rows without a PI"));
}

#[test]
fn test_selected_columns() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["process", arg(&fx.path("first.csv")), "--columns", "PI,TYPE,FAB 1"])
        .assert()
        .success()
        .stdout("PI NUMBER,TYPE,FAB 1\nP001,FIXED PART,Red\nP002,CUSTOMADE,Blue\n");
}

#[test]
fn test_unknown_column_fails() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["process", arg(&fx.path("first.csv")), "--columns", "PI,MODEL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown column: MODEL"));
}

#[test]
fn test_list_columns() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["process", arg(&fx.path("first.csv")), "--list-columns"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FAB 10\n"))
        .stdout(predicate::str::contains("REMARK ORDER 6\n"))
        .stdout(predicate::str::contains("ORDER\nTYPE\n"));
}

#[test]
fn test_tsv_has_no_header() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["process", arg(&fx.path("first.csv")), "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2024-01-15 00:00:00\t\tP001\tPO-1\t"))
        .stdout(predicate::str::contains("TIMESTAMP").not());
}

#[test]
fn test_two_files_with_reference() {
    let fx = Fixture::new();

    fx.cmd()
        .args([
            "process",
            arg(&fx.path("first.csv")),
            arg(&fx.path("second.csv")),
            "--reference",
            arg(&fx.path("reference.csv")),
            "--no-cache",
            "--columns",
            "PI,Debtor Name_File2,TYPE,MODEL,REMARK DELIVERY",
        ])
        .assert()
        .success()
        .stdout(
            "PI NUMBER,Debtor Name_File2,TYPE,MODEL,REMARK DELIVERY\n\
             P001,Acme Ltd,FIXED PART,Alpha,\n\
             P002,,CUSTOMADE,Custom U,gate 4\n\
             P003,Gamma,SERVICE,,\n",
        );
}

#[test]
fn test_unreachable_reference_degrades() {
    let fx = Fixture::new();

    fx.cmd()
        .args([
            "process",
            arg(&fx.path("first.csv")),
            arg(&fx.path("second.csv")),
            "--reference",
            arg(&fx.path("missing.csv")),
            "--no-cache",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("CUSTOMERS"))
        .stderr(predicate::str::contains("Reference table unavailable"));
}

#[test]
fn test_output_file() {
    let fx = Fixture::new();
    let out = fx.path("out.json");

    fx.cmd()
        .args(["process", arg(&fx.path("first.csv")), "-f", "json", "-o", arg(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["headers"][1], "PI NUMBER");
}

#[test]
fn test_missing_key_column_fails() {
    let fx = Fixture::new();
    let input = fx.path("nokey.csv");
    fs::write(&input, "Item Code,Qty\nABC,1\n").unwrap();

    fx.cmd()
        .args(["process", arg(&input)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required column: PI"));
}

#[test]
fn test_doc_no_alias_is_accepted() {
    let fx = Fixture::new();
    let input = fx.path("docno.csv");
    fs::write(&input, "Doc. No.,Item Code\nP7,Y55-01\n").unwrap();

    fx.cmd()
        .args(["process", arg(&input), "--columns", "PI,TYPE"])
        .assert()
        .success()
        .stdout("PI NUMBER,TYPE\nP7,SERVICE\n");
}

#[test]
fn test_config_get_and_set() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["config", "get", "reference.cache_ttl_secs"])
        .assert()
        .success()
        .stdout("3000\n");

    fx.cmd()
        .args(["config", "set", "reference.cache_ttl_secs", "60"])
        .assert()
        .success();

    fx.cmd()
        .args(["config", "get", "reference.cache_ttl_secs"])
        .assert()
        .success()
        .stdout("60\n");
}

#[test]
fn test_part_tag_read_from_description_text() {
    let fx = Fixture::new();
    let left = fx.path("left.csv");
    let right = fx.path("right.csv");
    fs::write(
        &left,
        "Doc No,Further Description\n\
         P001,\"Detail Description 1: Door\nDetail Description 2: Panel (F)\nORDER REMARK\nfirst remark\nsecond remark\"\n",
    )
    .unwrap();
    fs::write(&right, "Doc. No.,Qty\nP001,1\n,2\n").unwrap();

    fx.cmd()
        .args([
            "process",
            arg(&left),
            arg(&right),
            "--no-cache",
            "--columns",
            "PI,FAB 1,FAB 2,REMARK ORDER 1,REMARK ORDER 2,ORDER,TYPE",
        ])
        .assert()
        .success()
        .stdout(
            "PI NUMBER,FAB 1,FAB 2,REMARK ORDER 1,REMARK ORDER 2,ORDER,TYPE\n\
             P001,Door,Panel (F),first remark,second remark,NEW ORDER,FIXED PART\n",
        );
}
