//! Formatted console output shared by the CLI subcommands and the menu.

use crate::application::doctor::StatusReport;
use crate::application::installer::{InstallReport, StepOutcome};
use crate::application::updater::UpdateReport;

const WIDTH: usize = 64;

pub fn banner(title: &str) {
    println!("\n{}", "=".repeat(WIDTH));
    println!("  {}", title);
    println!("{}", "=".repeat(WIDTH));
}

pub fn section(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(WIDTH));
}

pub fn print_install_report(report: &InstallReport) {
    banner("FlowAI-ICT Trading Bot — Installation");

    for (name, outcome) in &report.steps {
        match outcome {
            StepOutcome::Done => println!("  ✅ {:<14} done", name),
            StepOutcome::Skipped(reason) => println!("  ⏭️  {:<14} skipped ({})", name, reason),
            StepOutcome::Degraded(warnings) => {
                println!("  ⚠️  {:<14} completed with warnings:", name);
                for w in warnings {
                    println!("       - {}", w);
                }
            }
        }
    }

    if let Some(backend) = report.backend {
        println!("\n  Supervision: {}", backend);
    }
    if report.already_installed() {
        println!("\n  Already installed — nothing to do.");
    }
    println!("{}\n", "=".repeat(WIDTH));
}

pub fn print_status(report: &StatusReport) {
    banner("FlowAI-ICT Trading Bot — Status");

    println!("  Installed:    {}", if report.installed { "yes" } else { "no" });
    println!("  Install dir:  {}", report.install_dir);
    println!("  Supervision:  {}", report.backend);
    println!("  Process:      {}", report.process);
    println!("  Virtualenv:   {}", if report.venv_present { "present" } else { "missing" });

    if let Some(manifest) = &report.manifest {
        println!("  Python:       {}", manifest.python_version);
        println!("  Installed at: {}", manifest.installed_at.format("%Y-%m-%d %H:%M UTC"));
        println!("  Last touched: {}", manifest.updated_at.format("%Y-%m-%d %H:%M UTC"));
    }

    match &report.env_findings {
        None => println!("  Config:       .env missing"),
        Some(findings) if findings.is_ok() && findings.warnings.is_empty() => {
            println!("  Config:       ok")
        }
        Some(findings) => {
            println!("  Config:");
            for e in &findings.errors {
                println!("    ❌ {}", e);
            }
            for w in &findings.warnings {
                println!("    ⚠️  {}", w);
            }
        }
    }

    match &report.log {
        None => println!("  Log:          no log file yet"),
        Some(log) => {
            println!(
                "  Log:          {} bytes, last write {}",
                log.size_bytes,
                log.modified.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }
    println!("{}\n", "=".repeat(WIDTH));
}

pub fn print_log_lines(lines: &[String]) {
    if lines.is_empty() {
        println!("(log is empty)");
        return;
    }
    for line in lines {
        println!("{}", line);
    }
}

pub fn print_update_report(report: &UpdateReport) {
    banner("Update complete");
    if let Some(head) = &report.head {
        println!("  Now at commit {}", head);
    }
    if report.restarted {
        println!("  Bot was running and has been restarted.");
    } else if !report.was_running {
        println!("  Bot was stopped; start it with 'flowaictl start'.");
    }
    println!("{}\n", "=".repeat(WIDTH));
}

pub fn print_menu() {
    banner("FlowAI-ICT Trading Bot — Management Menu");
    println!("   1) Install / repair");
    println!("   2) Start bot");
    println!("   3) Stop bot");
    println!("   4) Restart bot");
    println!("   5) Status");
    println!("   6) View logs");
    println!("   7) Edit configuration");
    println!("   8) Train AI model");
    println!("   9) Run backtest");
    println!("  10) Update bot");
    println!("  11) Uninstall");
    println!("   0) Exit");
}
