//! Query parameters that carry tokens between pages.

use std::fmt;
use std::str::FromStr;

use crate::transform;

/// Query parameter names a storefront page reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeepLinkParam {
    /// Envelope token with a prior package selection.
    Package,
    /// Envelope token with a prior product selection.
    Product,
    /// Envelope token with a heterogeneous item list.
    Items,
    /// Envelope token with a full cart snapshot.
    Cart,
    /// Envelope token with package rows to add to the cart on arrival.
    AddPackage,
    /// Envelope token with product rows to add to the cart on arrival.
    AddProduct,
    /// Sealed or compressed single-item checkout handoff.
    BuyNow,
}

impl DeepLinkParam {
    pub const ALL: [DeepLinkParam; 7] = [
        DeepLinkParam::Package,
        DeepLinkParam::Product,
        DeepLinkParam::Items,
        DeepLinkParam::Cart,
        DeepLinkParam::AddPackage,
        DeepLinkParam::AddProduct,
        DeepLinkParam::BuyNow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeepLinkParam::Package => "package",
            DeepLinkParam::Product => "product",
            DeepLinkParam::Items => "items",
            DeepLinkParam::Cart => "cart",
            DeepLinkParam::AddPackage => "addPackage",
            DeepLinkParam::AddProduct => "addProduct",
            DeepLinkParam::BuyNow => "buyNow",
        }
    }

    /// Whether the value is a sealed or compressed token rather than an
    /// envelope.
    pub fn is_sealed(&self) -> bool {
        matches!(self, DeepLinkParam::BuyNow)
    }
}

impl fmt::Display for DeepLinkParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeepLinkParam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown deep link parameter: {s}"))
    }
}

/// An ordered, decoded query string.
///
/// Parameters this crate does not know about are kept and written back
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLinkQuery {
    pairs: Vec<(String, String)>,
}

impl DeepLinkQuery {
    /// Parse `a=1&b=2`, with or without a leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();
        Self { pairs }
    }

    /// First value of `param`.
    pub fn get(&self, param: DeepLinkParam) -> Option<&str> {
        self.get_raw(param.as_str())
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `param`, replacing any existing occurrences in place.
    pub fn set(&mut self, param: DeepLinkParam, value: impl Into<String>) {
        let key = param.as_str();
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = false;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Consume `param`: return its first value and strip every occurrence,
    /// so a reload does not apply the same link twice.
    pub fn take(&mut self, param: DeepLinkParam) -> Option<String> {
        let key = param.as_str();
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        let (_, value) = self.pairs.remove(index);
        self.pairs.retain(|(k, _)| k != key);
        Some(value)
    }

    /// Strip every occurrence of `param`.
    pub fn remove(&mut self, param: DeepLinkParam) {
        let key = param.as_str();
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Known parameters present in this query, in query order.
    pub fn params(&self) -> Vec<DeepLinkParam> {
        let mut found = Vec::new();
        for (key, _) in &self.pairs {
            if let Ok(param) = key.parse::<DeepLinkParam>() {
                if !found.contains(&param) {
                    found.push(param);
                }
            }
        }
        found
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize back to `a=1&b=2` with every key and value percent-encoded.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    transform::percent_encode(k),
                    transform::percent_encode(v)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for DeepLinkQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    transform::percent_decode(&spaced).unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnvelopeCodec, SealedCodec};
    use serde_json::{json, Value};

    #[test]
    fn test_parse_and_get() {
        let query = DeepLinkQuery::parse("?utm=mail&product=abc_-1&addPackage=x%2By&empty");
        assert_eq!(query.get(DeepLinkParam::Product), Some("abc_-1"));
        assert_eq!(query.get(DeepLinkParam::AddPackage), Some("x+y"));
        assert_eq!(query.get_raw("utm"), Some("mail"));
        assert_eq!(query.get_raw("empty"), Some(""));
        assert_eq!(query.get(DeepLinkParam::Cart), None);
        assert_eq!(
            query.params(),
            vec![DeepLinkParam::Product, DeepLinkParam::AddPackage]
        );
    }

    #[test]
    fn test_take_consumes_once() {
        let mut query = DeepLinkQuery::parse("cart=one&page=2&cart=two");
        assert_eq!(query.take(DeepLinkParam::Cart).as_deref(), Some("one"));
        assert_eq!(query.take(DeepLinkParam::Cart), None);
        assert_eq!(query.to_query_string(), "page=2");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut query = DeepLinkQuery::parse("items=a&page=2&items=b");
        query.set(DeepLinkParam::Items, "c");
        assert_eq!(query.to_query_string(), "items=c&page=2");

        query.set(DeepLinkParam::BuyNow, "x/y=");
        assert_eq!(query.to_query_string(), "items=c&page=2&buyNow=x%2Fy%3D");
        query.remove(DeepLinkParam::Items);
        assert_eq!(query.to_query_string(), "page=2&buyNow=x%2Fy%3D");
    }

    #[test]
    fn test_param_names() {
        for param in DeepLinkParam::ALL {
            assert_eq!(param.as_str().parse::<DeepLinkParam>(), Ok(param));
        }
        assert!("buy_now".parse::<DeepLinkParam>().is_err());
        assert!(DeepLinkParam::BuyNow.is_sealed());
        assert!(!DeepLinkParam::AddProduct.is_sealed());
    }

    #[test]
    fn test_tokens_survive_a_query_string() {
        let envelope = EnvelopeCodec::new();
        let sealed = SealedCodec::default();
        let selection = json!({"productId": "P", "quantity": 1, "price": 19.5});

        let mut query = DeepLinkQuery::default();
        query.set(DeepLinkParam::Product, envelope.encode_product(&selection).unwrap());
        query.set(DeepLinkParam::BuyNow, sealed.seal(&selection).unwrap());
        query.set(DeepLinkParam::AddProduct, envelope.encode_product(&[&selection]).unwrap());

        let mut arrived = DeepLinkQuery::parse(&format!("?{}", query.to_query_string()));
        let product = arrived.take(DeepLinkParam::Product).unwrap();
        let buy_now = arrived.take(DeepLinkParam::BuyNow).unwrap();
        let add = arrived.take(DeepLinkParam::AddProduct).unwrap();

        assert_eq!(envelope.decode_product::<Value>(&product), Some(selection.clone()));
        assert_eq!(sealed.open::<Value>(&buy_now), Some(selection.clone()));
        assert_eq!(envelope.decode_product::<Vec<Value>>(&add), Some(vec![selection]));
        assert!(arrived.is_empty());
    }
}
