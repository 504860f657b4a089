mod core;
mod create_endpoint;
mod detail_page;
mod edit_endpoint;
mod form;
mod history_page;
mod new_page;

pub use core::{
    Transaction, TransactionId, TransactionType, create_transaction_table,
    format_form_date_time, get_transaction, get_transactions_for_account, get_transactions_page,
    parse_form_date_time,
};
pub use create_endpoint::{TransactionForm, create_transaction_endpoint};
pub use detail_page::get_transaction_detail_page;
pub use edit_endpoint::edit_transaction_endpoint;
pub use form::{TransactionFormDefaults, transaction_form_fields};
pub use history_page::get_history_page;
pub use new_page::get_new_transaction_page;

#[cfg(test)]
pub(crate) use core::{count_transactions, test_utils};
