use maud::{Markup, html};

use crate::{
    account::core::AccountIcon,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

pub struct AccountFormDefaults<'a> {
    pub name: Option<&'a str>,
    pub balance: Option<f64>,
    pub icon: AccountIcon,
    pub owner: Option<&'a str>,
    pub autofocus_name: bool,
}

pub fn account_form_fields(defaults: &AccountFormDefaults<'_>) -> Markup {
    let balance_str = defaults.balance.map(|balance| format!("{balance:.2}"));

    html! {
        div
        {
            label
                for="name"
                class=(FORM_LABEL_STYLE)
            {
                "Name"
            }

            input
                name="name"
                id="name"
                type="text"
                placeholder="e.g. Salary card"
                required
                value=[defaults.name]
                autofocus[defaults.autofocus_name]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="balance"
                class=(FORM_LABEL_STYLE)
            {
                "Balance (UZS)"
            }

            input
                name="balance"
                id="balance"
                type="number"
                step="0.01"
                placeholder="0.00"
                required
                value=[balance_str.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="icon"
                class=(FORM_LABEL_STYLE)
            {
                "Icon"
            }

            select
                name="icon"
                id="icon"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for icon in AccountIcon::ALL {
                    @if icon == defaults.icon {
                        option value=(icon.as_str()) selected { (icon.display_name()) }
                    } @else {
                        option value=(icon.as_str()) { (icon.display_name()) }
                    }
                }
            }
        }

        div
        {
            label
                for="owner"
                class=(FORM_LABEL_STYLE)
            {
                "Owner (optional)"
            }

            input
                name="owner"
                id="owner"
                type="text"
                placeholder="Name, email or phone"
                value=[defaults.owner]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
