//! Headless mode: run one submission from the terminal prompt.
//!
//! `authforms register` / `authforms login` read the email from stdin and the
//! password without echo, then drive the same controller the TUI uses.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use authforms_core::{Config, FormKind, Navigator, Services, SubmissionController, SubmitOutcome};

/// There is no page to leave; the redirect target is printed instead
struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, target: &str) {
        info!(target, "Redirect requested");
    }
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    Ok(email)
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}

pub async fn run(config: &Config, kind: FormKind) -> Result<()> {
    let services = Services::from_config(config, Arc::new(LogNavigator))?;

    println!("\n=== EyePredict {} ===\n", kind.title());
    let email = prompt_email()?;
    let password = prompt_password()?;

    println!("\nContacting {}...", services.client.base());
    submit(&services, kind, email, password, &mut io::stdout()).await
}

/// Submit one form and report a success on `out`; a failure becomes the error
async fn submit(
    services: &Services,
    kind: FormKind,
    email: String,
    password: String,
    out: &mut impl Write,
) -> Result<()> {
    let controller = SubmissionController::new(kind.spec(), services);
    let spec = controller.spec();
    let fields = HashMap::from([
        (spec.email_field.to_string(), email),
        (spec.password_field.to_string(), password),
    ]);

    match controller.submit(&fields).await? {
        SubmitOutcome::Succeeded { redirect } => {
            if let Some(message) = controller.region().visible() {
                writeln!(out, "{}", message.text)?;
            }
            writeln!(out, "Next page: {}", redirect)?;
            Ok(())
        }
        SubmitOutcome::Failed { message } => bail!(message),
        SubmitOutcome::Busy => bail!("Submission already in progress"),
    }
}
