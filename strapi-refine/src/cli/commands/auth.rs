//! Session command handlers

use anyhow::{Context, Result};
use colored::*;

use super::App;

pub async fn login(app: &App, username: Option<String>, password: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => {
            eprint!("Username: ");
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("Failed to read username")?;
            line.trim().to_string()
        }
    };
    if username.is_empty() {
        anyhow::bail!("Username is required");
    }

    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let role = app
        .auth
        .login(&username, &password)
        .await
        .with_context(|| format!("Login failed for {}", username))?;

    println!(
        "{} Logged in as {} ({})",
        "✓".bright_green(),
        username.bold(),
        role.name.cyan()
    );
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.auth.logout().await?;
    println!("{} Logged out", "✓".bright_green());
    Ok(())
}

pub async fn status(app: &App) -> Result<()> {
    match app.auth.check_auth().await {
        Ok(()) => println!(
            "{} Session token '{}' stored for {}",
            "✓".bright_green(),
            app.data.session().key(),
            app.data.get_api_url()
        ),
        Err(_) => println!("{} Not logged in", "✗".bright_red()),
    }
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let identity = app
        .auth
        .get_user_identity()
        .await
        .context("Failed to fetch user identity")?;
    app.print(&identity)
}

pub async fn permissions(app: &App) -> Result<()> {
    let role = app
        .auth
        .get_permissions()
        .await
        .context("Permission check failed")?;
    app.print(&role)
}
