use apotheca_app::context::AppContext;
use clap::Args;

/// Sign in to the storefront
#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "APOTHECA_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn login(ctx: &AppContext, args: &LoginArgs) -> Result<(), String> {
    let user = ctx
        .auth
        .login(&args.email, &args.password)
        .await
        .map_err(|error| error.user_message())?;

    println!("signed in as {} <{}>", user.name, user.email);

    Ok(())
}

pub(crate) fn logout(ctx: &AppContext) -> Result<(), String> {
    ctx.auth.logout().map_err(|error| error.user_message())?;

    println!("signed out");

    Ok(())
}

pub(crate) fn whoami(ctx: &AppContext) {
    match ctx.auth.current_user() {
        Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
        None => println!("not signed in"),
    }
}
