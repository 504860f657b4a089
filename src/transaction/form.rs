use maud::{Markup, html};
use time::OffsetDateTime;

use crate::{
    account::{Account, AccountId},
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::core::{TransactionType, format_form_date_time},
};

pub struct TransactionFormDefaults<'a> {
    pub account_id: Option<AccountId>,
    pub transaction_type: TransactionType,
    pub amount: Option<f64>,
    pub date: Option<OffsetDateTime>,
    pub location: Option<&'a str>,
    pub description: Option<&'a str>,
    pub max_date: OffsetDateTime,
    pub autofocus_amount: bool,
}

pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    accounts: &[Account],
) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount.abs()));
    let date_str = defaults.date.map(format_form_date_time);
    let max_date_str = format_form_date_time(defaults.max_date);

    html! {
        div
        {
            label
                for="account_id"
                class=(FORM_LABEL_STYLE)
            {
                "Account"
            }

            select
                name="account_id"
                id="account_id"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" disabled selected[defaults.account_id.is_none()]
                {
                    "Select an account"
                }

                @for account in accounts {
                    @if Some(account.id) == defaults.account_id {
                        option value=(account.id) selected { (account.name) }
                    } @else {
                        option value=(account.id) { (account.name) }
                    }
                }
            }
        }

        div
        {
            label
                for="type_"
                class=(FORM_LABEL_STYLE)
            {
                "Transaction type"
            }

            select
                name="type_"
                id="type_"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for transaction_type in TransactionType::ALL {
                    @if transaction_type == defaults.transaction_type {
                        option value=(transaction_type.as_str()) selected
                        {
                            (transaction_type.display_name())
                        }
                    } @else {
                        option value=(transaction_type.as_str())
                        {
                            (transaction_type.display_name())
                        }
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount (UZS)"
            }

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                min="0.01"
                placeholder="0.01"
                required
                value=[amount_str.as_deref()]
                autofocus[defaults.autofocus_amount]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="datetime-local"
                max=(max_date_str)
                value=[date_str.as_deref()]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="location"
                class=(FORM_LABEL_STYLE)
            {
                "Location"
            }

            input
                name="location"
                id="location"
                type="text"
                placeholder="e.g. Korzinka"
                value=[defaults.location]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
