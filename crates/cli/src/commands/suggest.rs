//! Product suggestion command.

use cookie_shop_client::suggestions::{self, Suggestion, SuggestionOutcome};
use cookie_shop_client::{ClientError, ShopContext};

#[allow(clippy::print_stdout)]
pub async fn submit(
    context: &ShopContext,
    author: String,
    product_name: String,
    description: String,
) -> Result<(), ClientError> {
    let suggestion = Suggestion {
        author,
        product_name,
        description,
    };

    match suggestions::submit(context.api(), &suggestion).await? {
        SuggestionOutcome::Submitted(Some(id)) => println!("Suggestion submitted (id {id})"),
        SuggestionOutcome::Submitted(None) => println!("Suggestion submitted"),
        SuggestionOutcome::SignInRequired => println!("Sign in to submit suggestions"),
        SuggestionOutcome::Invalid => println!("Author, product and description are required"),
    }
    Ok(())
}
