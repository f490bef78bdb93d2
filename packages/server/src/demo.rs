//! Demo actions served by the `interval-server` binary.

use std::time::Duration;

use anyhow::bail;
use interval_core::{io, Action, InputNumberProps, InputTextProps, TransactionManager};

/// Register every demo action.
pub fn demo_manager() -> TransactionManager {
    TransactionManager::builder()
        .action("hello_world", hello_world())
        .action("hello", hello())
        .action("add_numbers", add_numbers())
        .action("always_fails", always_fails())
        .build()
}

fn hello_world() -> Action {
    Action::new(|| async {
        tracing::info!("Hello world called");
        let first_name = io::input_text("What is your first name?").await?;

        tokio::time::sleep(Duration::from_secs(1)).await;

        let last_name = io::input_text(
            InputTextProps::new("What is your last name?").placeholder("Lovelace"),
        )
        .await?;

        tracing::info!("Hello {} {}", first_name, last_name);
        Ok(())
    })
}

fn hello() -> Action {
    Action::new(|| async {
        let name = io::input_text(InputTextProps::new("What is your name?")).await?;
        tracing::info!("Hello, {}", name);
        Ok(())
    })
}

fn add_numbers() -> Action {
    Action::new(|| async {
        let a = io::input_number("First number").await?;
        let b = io::input_number(InputNumberProps::new("Second number")).await?;
        tracing::info!(a, b, sum = a + b, "Added numbers");
        Ok(())
    })
}

fn always_fails() -> Action {
    Action::new(|| async { bail!("this action always fails") })
}
