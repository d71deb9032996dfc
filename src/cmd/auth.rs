//! Session commands: `login`, `register`, `logout`, `whoami`.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password};

use super::AppContext;
use marketlens::AuthFlow;
use marketlens::errors::AuthError;
use marketlens::transport::Credentials;
use marketlens::ui::icons::{CHECK, KEY};

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(e) => Ok(e),
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email"),
    }
}

fn auth_failure(ctx: &AppContext, err: AuthError) -> anyhow::Error {
    match err {
        AuthError::Transport(e) if !e.is_unauthorized() => ctx.transport_failure(e),
        AuthError::Transport(e) => anyhow::anyhow!("{}", e.message),
        AuthError::Session(e) => anyhow::Error::new(e),
    }
}

pub async fn cmd_login(ctx: &AppContext, email: Option<String>) -> Result<()> {
    let email = prompt_email(email)?;
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;

    let flow = AuthFlow::new(ctx.client.clone(), ctx.session.clone());
    let user = flow
        .login(&Credentials::new(email, password))
        .await
        .map_err(|e| auth_failure(ctx, e))?;

    if !ctx.session.is_authenticated() {
        anyhow::bail!(
            "Logged in, but the session could not be saved to {}",
            ctx.settings.storage_dir.display()
        );
    }
    if ctx.json {
        return ctx.print_json(&user);
    }
    println!("{}Logged in as {}", CHECK, style(user.display_name()).bold());
    Ok(())
}

pub async fn cmd_register(ctx: &AppContext, email: Option<String>) -> Result<()> {
    let email = prompt_email(email)?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("Failed to read password")?;

    let flow = AuthFlow::new(ctx.client.clone(), ctx.session.clone());
    let user = flow
        .register(&Credentials::new(email, password))
        .await
        .map_err(|e| auth_failure(ctx, e))?;

    if !ctx.session.is_authenticated() {
        anyhow::bail!(
            "Registered, but the session could not be saved to {}",
            ctx.settings.storage_dir.display()
        );
    }
    if ctx.json {
        return ctx.print_json(&user);
    }
    println!(
        "{}Account created. Logged in as {}",
        CHECK,
        style(user.display_name()).bold()
    );
    Ok(())
}

pub fn cmd_logout(ctx: &AppContext) -> Result<()> {
    AuthFlow::new(ctx.client.clone(), ctx.session.clone()).logout();
    if !ctx.json {
        println!("Logged out.");
    }
    Ok(())
}

pub fn cmd_whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.require_session()?;
    let Some(user) = session.user() else {
        anyhow::bail!("Session has no user");
    };
    if ctx.json {
        return ctx.print_json(user);
    }
    println!("{}{}", KEY, style(user.display_name()).bold());
    println!("  id: {}", user.id);
    Ok(())
}
