mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_types() -> Result<(), Box<dyn std::error::Error>> {
    let flows = common::flows_file()?;

    let mut cmd = Command::new(cargo_bin!("appflow"));
    cmd.arg("types").arg("--flows").arg(flows.path());

    cmd.assert()
        .success()
        .stdout(predicate::eq("sale\nrefund\nshowLoyaltyPoints\n"))
        // duplicate "sale" and the nameless flow
        .stderr(predicate::str::contains("Skipping flow").count(2));

    Ok(())
}

#[test]
fn test_cli_types_by_request_class() -> Result<(), Box<dyn std::error::Error>> {
    let flows = common::flows_file()?;

    let mut cmd = Command::new(cargo_bin!("appflow"));
    cmd.arg("types")
        .arg("--flows")
        .arg(flows.path())
        .arg("--request-class")
        .arg("generic");

    cmd.assert()
        .success()
        .stdout(predicate::eq("showLoyaltyPoints\n"));

    Ok(())
}

#[test]
fn test_cli_stages() -> Result<(), Box<dyn std::error::Error>> {
    let flows = common::flows_file()?;

    let mut cmd = Command::new(cargo_bin!("appflow"));
    cmd.arg("stages").arg("--flows").arg(flows.path()).arg("sale");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PRE_FLOW: loyalty\n"))
        .stdout(predicate::str::contains("PAYMENT_CARD_READING: reader\n"))
        .stdout(predicate::str::contains("POST_TRANSACTION: receipts, loyalty\n"));

    Ok(())
}

#[test]
fn test_cli_unknown_flow() -> Result<(), Box<dyn std::error::Error>> {
    let flows = common::flows_file()?;

    let mut cmd = Command::new(cargo_bin!("appflow"));
    cmd.arg("stages").arg("--flows").arg(flows.path()).arg("void");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown flow"));

    Ok(())
}

#[test]
fn test_cli_resolve_with_condition() -> Result<(), Box<dyn std::error::Error>> {
    let flows = common::flows_file()?;
    let services = common::services_file()?;

    let mut cmd = Command::new(cargo_bin!("appflow"));
    cmd.arg("resolve")
        .arg("--flows")
        .arg(flows.path())
        .arg("--services")
        .arg(services.path())
        .arg("--currency")
        .arg("GBP")
        .arg("--condition")
        .arg("loyaltyMember")
        .arg("sale");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PRE_FLOW: loyalty\n"))
        .stdout(predicate::str::contains("PAYMENT_CARD_READING: reader\n"))
        .stdout(predicate::str::contains("POST_TRANSACTION: receipts, loyalty\n"));

    Ok(())
}

#[test]
fn test_cli_resolve_skips_optional_apps() -> Result<(), Box<dyn std::error::Error>> {
    let flows = common::flows_file()?;
    let services = common::services_file()?;

    let mut cmd = Command::new(cargo_bin!("appflow"));
    cmd.arg("resolve")
        .arg("--flows")
        .arg(flows.path())
        .arg("--services")
        .arg(services.path())
        .arg("--currency")
        .arg("EUR")
        .arg("sale");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PRE_FLOW: \n"))
        .stdout(predicate::str::contains("PAYMENT_CARD_READING: reader\n"));

    Ok(())
}

#[test]
fn test_cli_resolve_ineligible_mandatory_app() -> Result<(), Box<dyn std::error::Error>> {
    let flows = common::flows_file()?;
    let services = common::services_file()?;

    let mut cmd = Command::new(cargo_bin!("appflow"));
    cmd.arg("resolve")
        .arg("--flows")
        .arg(flows.path())
        .arg("--services")
        .arg(services.path())
        .arg("--currency")
        .arg("USD")
        .arg("refund");

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("'reader'"));

    Ok(())
}

#[test]
fn test_cli_basket() -> Result<(), Box<dyn std::error::Error>> {
    let basket = common::basket_file(&[
        ["Coffee", "1", "250"],
        ["Tea", "2", "180"],
        ["Cake", "x", "300"],
        ["Coffee", "2", "250"],
        ["Discount", "1", "-100"],
    ])?;

    let mut cmd = Command::new(cargo_bin!("appflow"));
    cmd.arg("basket").arg(basket.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading basket line"))
        .stdout(predicate::str::contains("Coffee x3 = 750\n"))
        .stdout(predicate::str::contains("Tea x2 = 360\n"))
        .stdout(predicate::str::contains("Discount x1 = -100\n"))
        .stdout(predicate::str::contains("unique items: 3\n"))
        .stdout(predicate::str::contains("total items: 6\n"))
        .stdout(predicate::str::contains("total value: 1010\n"));

    Ok(())
}
