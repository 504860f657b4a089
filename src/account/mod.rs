mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod detail_page;
mod edit_endpoint;
mod edit_page;
mod form;

pub use core::{
    Account, AccountIcon, AccountId, create_account_table, get_account, get_all_accounts,
    get_total_account_balance,
};
pub use create_endpoint::create_account_endpoint;
pub use create_page::get_create_account_page;
pub use delete_endpoint::delete_account_endpoint;
pub use detail_page::get_account_detail_page;
pub use edit_endpoint::edit_account_endpoint;
pub use edit_page::get_edit_account_page;

#[cfg(test)]
pub(crate) use create_endpoint::{AccountForm, create_account};
