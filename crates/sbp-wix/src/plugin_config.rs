//! Static payment-provider descriptor shown to merchants in the Wix dashboard.

use serde::Serialize;

pub const TITLE: &str = "Swiss Bitcoin Pay";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoPair {
    pub svg: &'static str,
    pub png: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Logos {
    pub white: LogoPair,
    pub colored: LogoPair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedPage {
    pub title: &'static str,
    pub logos: Logos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub hosted_page: HostedPage,
}

/// Merchant credential input, rendered by Wix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialsField {
    SimpleField {
        name: &'static str,
        label: &'static str,
    },
    CheckboxField {
        name: &'static str,
        label: &'static str,
        tooltip: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub title: &'static str,
    pub payment_methods: Vec<PaymentMethod>,
    pub credentials_fields: Vec<CredentialsField>,
}

pub fn plugin_config() -> PluginConfig {
    PluginConfig {
        title: TITLE,
        payment_methods: vec![PaymentMethod {
            hosted_page: HostedPage {
                title: "Bitcoin (Onchain 🔗 & Lightning ⚡)",
                logos: Logos {
                    white: LogoPair {
                        svg: "https://swiss-bitcoin-pay.ch/9dd7bb2f8b515309085a.svg",
                        png: "https://swiss-bitcoin-pay.ch/5fe5def1bdd06bcb66a0.png",
                    },
                    colored: LogoPair {
                        svg: "https://swiss-bitcoin-pay.ch/48a2ed4d63697dd65b45.svg",
                        png: "https://swiss-bitcoin-pay.ch/d6a3c5f7023ed0ff951c.png",
                    },
                },
            },
        }],
        credentials_fields: vec![
            CredentialsField::SimpleField {
                name: "apiKey",
                label: "API key",
            },
            CredentialsField::SimpleField {
                name: "hmacSecret",
                label: "API secret",
            },
            CredentialsField::CheckboxField {
                name: "onChain",
                label: "Allow Onchain payments",
                tooltip: "By checking this box, you're allowing clients to pay via Onchain",
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_wix_shape() {
        let v = serde_json::to_value(plugin_config()).unwrap();
        assert_eq!(v["title"], "Swiss Bitcoin Pay");
        assert_eq!(
            v["paymentMethods"][0]["hostedPage"]["logos"]["colored"]["png"],
            "https://swiss-bitcoin-pay.ch/d6a3c5f7023ed0ff951c.png"
        );
        let fields = v["credentialsFields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0]["simpleField"]["name"], "apiKey");
        assert_eq!(fields[1]["simpleField"]["label"], "API secret");
        assert_eq!(fields[2]["checkboxField"]["name"], "onChain");
    }
}
