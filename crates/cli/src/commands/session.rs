//! Account and sign-in state commands.

use cookie_shop_client::auth::{LoginRequest, RegisterRequest};
use cookie_shop_client::favorites::SyncReport;
use cookie_shop_client::session::Session;
use cookie_shop_client::storage::{self, keys};
use cookie_shop_client::{ClientError, ShopContext};
use cookie_shop_core::LocalFavoriteItem;

/// Log in, then push guest favorites to the server.
pub async fn login(context: &ShopContext, email: String, password: String) -> Result<(), ClientError> {
    let report = context.login(&LoginRequest::new(email, password)).await?;
    print_signed_in(context, &report)
}

/// Create an account and sign in as it.
pub async fn register(context: &ShopContext, request: RegisterRequest) -> Result<(), ClientError> {
    let report = context.register(&request).await?;
    print_signed_in(context, &report)
}

#[allow(clippy::print_stdout)]
fn print_signed_in(context: &ShopContext, report: &SyncReport) -> Result<(), ClientError> {
    if let Session::Authenticated(credentials) = context.session()? {
        println!("Signed in as user {}", credentials.user_id);
    }
    if report.attempted > 0 {
        println!(
            "Synced {} of {} guest favorites ({} failed)",
            report.synced, report.attempted, report.failed
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn logout(context: &ShopContext) -> Result<(), ClientError> {
    context.sign_out().await?;
    println!("Signed out");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn status(context: &ShopContext) -> Result<(), ClientError> {
    match context.session()? {
        Session::Authenticated(credentials) => {
            println!("Signed in as user {}", credentials.user_id);
        }
        Session::Guest => println!("Guest"),
    }

    let local: Vec<LocalFavoriteItem> =
        storage::load_json(context.store().as_ref(), keys::LOCAL_FAVORITES)?.unwrap_or_default();
    let cart_lines = context.cart().await.items().len();

    println!("API:              {}", context.config().api_url);
    println!("Data directory:   {}", context.config().data_dir.display());
    println!("Guest favorites:  {}", local.len());
    println!("Cart lines:       {cart_lines}");
    Ok(())
}
