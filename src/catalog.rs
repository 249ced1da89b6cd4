//! Built-in plugin catalog.
//!
//! Manifests and widget slots of the plugins the shell ships with.

use crate::plugin::{MenuItemDescriptor, PluginManifest, RouteDescriptor};
use crate::widget::WidgetMapping;

/// Card transactions plugin ID.
pub const CARD_TRANSACTION: &str = "card-transaction";
/// Balance plugin ID.
pub const BALANCE: &str = "balance";
/// Invoice plugin ID.
pub const INVOICE: &str = "invoice";
/// Payment plugin ID.
pub const PAYMENT: &str = "payment";
/// Sport center plugin ID.
pub const SPORT_CENTER: &str = "sport-center";
/// Donation plugin ID.
pub const DONATION: &str = "donation";

fn manifest(id: &str, name: &str, routes: &[&str], menu: (&str, &str, &str)) -> PluginManifest {
    let mut manifest = PluginManifest::new(id).with_name(name);
    for route in routes {
        manifest = manifest.with_route(
            RouteDescriptor::new(route).with_title_key(&format!("{}.title.{}", id, route)),
        );
    }
    let (item, label_key, icon) = menu;
    let entry = routes.first().copied().unwrap_or_default();
    manifest.with_menu_item(MenuItemDescriptor::new(item, label_key, entry).with_icon(icon))
}

/// Manifests of the built-in plugins, in menu order.
pub fn builtin_manifests() -> Vec<PluginManifest> {
    vec![
        manifest(
            BALANCE,
            "Balance",
            &["BalanceHome", "TopUp"],
            ("balance", "menu.balance", "wallet"),
        ),
        manifest(
            CARD_TRANSACTION,
            "Card Transactions",
            &["CardList", "CardDetail"],
            ("cards", "menu.cards", "credit-card"),
        ),
        manifest(
            PAYMENT,
            "Payment",
            &["PaymentHome", "PaymentConfirm", "PaymentReceipt"],
            ("payment", "menu.payment", "send"),
        ),
        manifest(
            INVOICE,
            "Invoice",
            &["InvoiceList", "InvoiceDetail"],
            ("invoices", "menu.invoices", "file-text"),
        ),
        manifest(
            SPORT_CENTER,
            "Sport Center",
            &["SportCenterHome", "Booking", "BookingDetail"],
            ("sport-center", "menu.sport_center", "activity"),
        ),
        manifest(
            DONATION,
            "Donation",
            &["DonationHome", "ZakatCalculator"],
            ("donation", "menu.donation", "heart"),
        ),
    ]
}

/// Default widget slots of the home screen.
pub fn builtin_widgets() -> Vec<WidgetMapping> {
    vec![
        WidgetMapping::new("balance-card", BALANCE, "BalanceCard"),
        WidgetMapping::new("card-summary", CARD_TRANSACTION, "CardSummary"),
        WidgetMapping::new("payment-shortcuts", PAYMENT, "PaymentShortcuts"),
        WidgetMapping::new("invoice-summary", INVOICE, "InvoiceSummary"),
        WidgetMapping::new("sport-center-booking", SPORT_CENTER, "UpcomingBooking"),
        WidgetMapping::new("donation-banner", DONATION, "DonationBanner"),
    ]
}
