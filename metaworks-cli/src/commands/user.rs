//! `metaworks user`: account management without going through the API
//!
//! The first admin has to come from here, since `/api/users` needs one.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use metaworks_server::db::UserRepo;
use metaworks_server::http::auth::hash_password;
use metaworks_server::models::{CreateUserRequest, NewUser};

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create an account
    Add(AddUserArgs),
    /// List accounts
    List(ListUsersArgs),
}

#[derive(Parser, Debug)]
pub struct AddUserArgs {
    /// Login name
    pub username: String,

    /// Password (at least 8 characters)
    #[arg(long, env = "METAWORKS_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Role: user or admin
    #[arg(long, default_value = "user")]
    pub role: String,

    /// Access tier stored on the account
    #[arg(long, default_value = "trial")]
    pub access_level: String,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ListUsersArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_user(cmd: UserCommand) -> Result<()> {
    match cmd {
        UserCommand::Add(args) => add_user(args).await,
        UserCommand::List(args) => list_users(args).await,
    }
}

async fn add_user(args: AddUserArgs) -> Result<()> {
    let new_user = NewUser::try_from(CreateUserRequest {
        username: args.username,
        password: args.password,
        role: Some(args.role),
        access_level: Some(args.access_level),
        is_active: Some(true),
    })
    .context("Invalid user details")?;

    let (_, pool) = super::connect(args.database_url).await?;
    let hash = hash_password(&new_user.password)?;
    let user = UserRepo::new(&pool)
        .create(&new_user, &hash)
        .await
        .context("Failed to create user")?;

    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "user created");
    println!("Created {} '{}' (id {})", user.role, user.username, user.id);
    Ok(())
}

async fn list_users(args: ListUsersArgs) -> Result<()> {
    let (_, pool) = super::connect(args.database_url).await?;
    let users = UserRepo::new(&pool).list().await?;

    for user in users {
        println!(
            "{:>5}  {:<24} {:<6} {:<10} {}",
            user.id,
            user.username,
            user.role,
            user.access_level,
            if user.is_active { "active" } else { "inactive" }
        );
    }
    Ok(())
}
