//! Specs for `modgate select`.

use crate::prelude::*;

const SHOP_TESTS: &[&str] = &[
    "a.b.OrderTest",
    "x.shipping.ShipmentTest",
    "x.billing.InvoiceTest",
];

fn shop_with_order_change() -> Project {
    let temp = Project::git();
    temp.file("orders/src/main/java/a/b/C.java", "class C {}\n");
    temp
}

/// > A change runs its own module and every module that depends on it
#[test]
fn runs_changed_module_and_dependents() {
    let temp = shop_with_order_change();

    select(SHOP_TESTS)
        .graph("shop")
        .pwd(temp.path())
        .passes()
        .stdout_eq(
            "RUN  a.b.OrderTest: changes in module `orders`\n\
             RUN  x.shipping.ShipmentTest: changes in dependency `orders` of module `shipping`\n\
             SKIP x.billing.InvoiceTest: no changes in module `billing` or its dependencies\n\
             3 tests: 2 run, 1 skipped\n",
        );
}

#[test]
fn json_output_reports_summary() {
    let temp = shop_with_order_change();

    let json = select(SHOP_TESTS).graph("shop").pwd(temp.path()).json().passes();

    assert_eq!(json["source"], "unpushed changes");
    assert_eq!(
        json["summary"],
        serde_json::json!({"total": 3, "run": 2, "skip": 1})
    );
    assert_eq!(json["tests"][2]["test"], "x.billing.InvoiceTest");
    assert_eq!(json["tests"][2]["verdict"], "skip");
    assert!(json.get("detection_error").is_none());
}

#[test]
fn json_graph_description_is_accepted() {
    let temp = shop_with_order_change();
    let graph = fixture("shop").join("modules.json");

    select(&["x.shipping.ShipmentTest"])
        .args(&["--graph", graph.to_str().unwrap()])
        .pwd(temp.path())
        .passes()
        .stdout_has("RUN  x.shipping.ShipmentTest");
}

/// > Nothing changed means nothing can be skipped safely
#[test]
fn no_changes_runs_everything() {
    let temp = Project::git();

    select(SHOP_TESTS)
        .graph("shop")
        .pwd(temp.path())
        .passes()
        .stdout_has(predicates::str::contains("SKIP").not())
        .stdout_has("3 tests: 3 run, 0 skipped");
}

/// > Resource-only changes cannot be attributed to a module
#[test]
fn resource_only_changes_run_everything() {
    let temp = Project::git();
    temp.file("docs/guide.md", "# guide\n");
    temp.file("orders/src/main/resources/application.yml", "port: 8080\n");

    select(SHOP_TESTS)
        .graph("shop")
        .pwd(temp.path())
        .passes()
        .stdout_has("RUN  x.billing.InvoiceTest: no compilation-unit changes detected")
        .stdout_has("3 tests: 3 run, 0 skipped");
}

#[test]
fn resource_under_source_root_runs_everything() {
    let temp = Project::git();
    temp.file("orders/src/main/java/a/b/messages.properties", "greeting=hi\n");

    select(SHOP_TESTS)
        .graph("shop")
        .pwd(temp.path())
        .passes()
        .stdout_has("3 tests: 3 run, 0 skipped");
}

/// > Detection failure runs every test and is reported once
#[test]
fn detection_failure_fails_open() {
    let temp = Project::empty();

    let result = select(SHOP_TESTS)
        .graph("shop")
        .pwd(temp.path())
        .passes()
        .stdout_has("3 tests: 3 run, 0 skipped")
        .stderr_has("warning: change detection failed");

    assert_eq!(result.stderr().matches("change detection failed").count(), 1);
}

#[test]
fn detection_failure_in_json() {
    let temp = Project::empty();

    let json = select(SHOP_TESTS).graph("shop").pwd(temp.path()).json().passes();

    assert!(json["detection_error"].is_string());
    assert_eq!(json["summary"]["run"], 3);
}

#[test]
fn method_candidates_always_run() {
    let temp = shop_with_order_change();

    select(&["x.billing.InvoiceTest#totals"])
        .graph("shop")
        .pwd(temp.path())
        .passes()
        .stdout_eq(
            "RUN  x.billing.InvoiceTest#totals: method of an enabled test class\n\
             1 test: 1 run, 0 skipped\n",
        );
}

#[test]
fn unowned_package_runs() {
    let temp = shop_with_order_change();

    select(&["org.other.ThingTest"])
        .graph("shop")
        .pwd(temp.path())
        .passes()
        .stdout_has("RUN  org.other.ThingTest: unable to locate module");
}

#[test]
fn graph_path_from_config() {
    let temp = shop_with_order_change();
    let graph = std::fs::read_to_string(fixture("shop").join("modules.toml")).unwrap();
    temp.file("build/modules.toml", &graph);
    temp.config("[graph]\npath = \"build/modules.toml\"\n");

    select(&["x.billing.InvoiceTest"])
        .pwd(temp.path())
        .passes()
        .stdout_has("SKIP x.billing.InvoiceTest");
}

#[test]
fn candidates_from_stdin() {
    let temp = shop_with_order_change();

    select(&["-"])
        .graph("shop")
        .pwd(temp.path())
        .passes_with_stdin("# shop tests\na.b.OrderTest\n\nx.billing.InvoiceTest\n")
        .stdout_has("RUN  a.b.OrderTest")
        .stdout_has("SKIP x.billing.InvoiceTest")
        .stdout_has("2 tests: 1 run, 1 skipped");
}

#[test]
fn missing_graph_exits_with_config_error() {
    let temp = Project::git();

    select(&["a.b.OrderTest"])
        .pwd(temp.path())
        .exits(2)
        .stderr_has("no module graph given");
}

#[test]
fn invalid_graph_exits_with_config_error() {
    let temp = Project::git();
    temp.file("modules.toml", "[[module]]\nname = \"a\"\ndepends-on = [\"ghost\"]\n");

    select(&["a.b.OrderTest"])
        .args(&["--graph", "modules.toml"])
        .pwd(temp.path())
        .exits(2)
        .stderr_has("undeclared module `ghost`");
}

#[test]
fn invalid_candidate_exits_with_argument_error() {
    let temp = Project::git();

    select(&["a..B"])
        .graph("shop")
        .pwd(temp.path())
        .exits(2)
        .stderr_has("invalid test identity `a..B`");
}

#[test]
fn logging_goes_to_stderr() {
    let temp = shop_with_order_change();

    select(&["a.b.OrderTest"])
        .graph("shop")
        .pwd(temp.path())
        .env("MODGATE_LOG", "info")
        .passes()
        .stdout_eq("RUN  a.b.OrderTest: changes in module `orders`\n1 test: 1 run, 0 skipped\n")
        .stderr_has("using unpushed changes");
}
