//! Outbound form assembly.

use super::TokenRequest;
use crate::{config::PaymentOptions, signing::TokenFields};

/// Names of the fields POSTed to the token endpoint, in emission order.
pub const FORM_FIELDS: [&str; 18] = [
    "merchant_id",
    "user_ip",
    "merchant_oid",
    "email",
    "payment_amount",
    "user_basket",
    "debug_on",
    "no_installment",
    "max_installment",
    "paytr_token",
    "user_name",
    "user_address",
    "user_phone",
    "merchant_ok_url",
    "merchant_fail_url",
    "timeout_limit",
    "currency",
    "test_mode",
];

const fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Field values of one token request, rendered as the strings that are both
/// signed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PaymentForm {
    merchant_id: String,
    user_ip: String,
    merchant_oid: String,
    email: String,
    payment_amount: String,
    user_basket: String,
    debug_on: &'static str,
    no_installment: &'static str,
    max_installment: String,
    user_name: String,
    user_address: String,
    user_phone: String,
    merchant_ok_url: String,
    merchant_fail_url: String,
    timeout_limit: String,
    currency: &'static str,
    test_mode: &'static str,
}

impl PaymentForm {
    /// Renders `request` with already-resolved `options` and the encoded basket.
    pub(crate) fn new(
        merchant_id: &str,
        request: &TokenRequest,
        options: &PaymentOptions,
        user_basket: String,
    ) -> Self {
        Self {
            merchant_id: merchant_id.to_owned(),
            user_ip: request.user_ip.clone(),
            merchant_oid: request.merchant_oid.clone(),
            email: request.email.clone(),
            payment_amount: request.payment_amount.to_string(),
            user_basket,
            debug_on: flag(options.debug_on),
            no_installment: flag(options.no_installment),
            max_installment: options.max_installment.to_string(),
            user_name: request.user_name.clone(),
            user_address: request.user_address.clone(),
            user_phone: request.user_phone.clone(),
            merchant_ok_url: options.merchant_ok_url.clone().unwrap_or_default(),
            merchant_fail_url: options.merchant_fail_url.clone().unwrap_or_default(),
            timeout_limit: options.timeout_limit.to_string(),
            currency: options.currency.map_or("", |currency| currency.as_str()),
            test_mode: flag(options.test_mode),
        }
    }

    /// Borrows the signed subset of the form.
    pub(crate) fn token_fields(&self) -> TokenFields<'_> {
        TokenFields {
            merchant_id: &self.merchant_id,
            user_ip: &self.user_ip,
            merchant_oid: &self.merchant_oid,
            email: &self.email,
            payment_amount: &self.payment_amount,
            user_basket: &self.user_basket,
            no_installment: self.no_installment,
            max_installment: &self.max_installment,
            currency: self.currency,
            test_mode: self.test_mode,
        }
    }

    /// Consumes the form and returns `(name, value)` pairs in [`FORM_FIELDS`] order.
    pub(crate) fn into_pairs(self, paytr_token: String) -> Vec<(&'static str, String)> {
        let values = [
            self.merchant_id,
            self.user_ip,
            self.merchant_oid,
            self.email,
            self.payment_amount,
            self.user_basket,
            self.debug_on.to_owned(),
            self.no_installment.to_owned(),
            self.max_installment,
            paytr_token,
            self.user_name,
            self.user_address,
            self.user_phone,
            self.merchant_ok_url,
            self.merchant_fail_url,
            self.timeout_limit,
            self.currency.to_owned(),
            self.test_mode.to_owned(),
        ];
        FORM_FIELDS.into_iter().zip(values).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{basket::BasketItem, config::Currency};

    fn fixture_request() -> TokenRequest {
        TokenRequest::new("SP1001", "192.168.1.56", "buyer@example.com", 3588, vec![BasketItem::new(
            "Kalem", "35.88", 1,
        )])
        .with_customer("Ada Lovelace", "Moda Cd. 1, Istanbul", "05550000000")
    }

    fn fixture_options() -> PaymentOptions {
        PaymentOptions {
            currency: Some(Currency::Tl),
            max_installment: 6,
            test_mode: true,
            merchant_ok_url: Some("https://shop.example.com/ok".to_owned()),
            merchant_fail_url: Some("https://shop.example.com/fail".to_owned()),
            ..PaymentOptions::default()
        }
    }

    fn fixture_form() -> PaymentForm {
        PaymentForm::new("100001", &fixture_request(), &fixture_options(), "BASKET".to_owned())
    }

    #[test]
    fn test_pairs_follow_form_field_order() {
        let pairs = fixture_form().into_pairs("TOKEN".to_owned());
        let names: Vec<&str> = pairs.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, FORM_FIELDS);
    }

    #[test]
    fn test_pairs_carry_rendered_values() {
        let pairs = fixture_form().into_pairs("TOKEN".to_owned());
        let value = |name: &str| pairs.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str()).unwrap();

        assert_eq!(value("merchant_id"), "100001");
        assert_eq!(value("payment_amount"), "3588");
        assert_eq!(value("user_basket"), "BASKET");
        assert_eq!(value("paytr_token"), "TOKEN");
        assert_eq!(value("debug_on"), "0");
        assert_eq!(value("no_installment"), "0");
        assert_eq!(value("max_installment"), "6");
        assert_eq!(value("timeout_limit"), "30");
        assert_eq!(value("currency"), "TL");
        assert_eq!(value("test_mode"), "1");
        assert_eq!(value("user_name"), "Ada Lovelace");
        assert_eq!(value("merchant_fail_url"), "https://shop.example.com/fail");
    }

    #[test]
    fn test_token_fields_match_sent_values() {
        let form = fixture_form();
        let fields = form.token_fields();
        let pairs = form.clone().into_pairs(String::new());

        for (name, signed) in fields.ordered() {
            let sent = pairs.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str());
            assert_eq!(sent, Some(signed), "field {name} differs between signature and form");
        }
    }

    #[test]
    fn test_absent_currency_and_urls_are_sent_empty() {
        let form = PaymentForm::new("100001", &fixture_request(), &PaymentOptions::default(), "B".to_owned());
        assert_eq!(form.token_fields().currency, "");

        let pairs = form.into_pairs("T".to_owned());
        let value = |name: &str| pairs.iter().find(|(n, _)| *n == name).map(|(_, v)| v.clone()).unwrap();
        assert_eq!(value("currency"), "");
        assert_eq!(value("merchant_ok_url"), "");
        assert_eq!(value("max_installment"), "0");
    }
}
