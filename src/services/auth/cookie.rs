//! Credential transport as a browser-managed cookie.
//!
//! - 発行: `Set-Cookie: token=<jwt>; HttpOnly; Path=/; Max-Age=..; SameSite=..[; Secure]`
//! - 失効 (logout): 同じ属性で値を空にして `Max-Age=0`
//! - 受信: `Cookie` ヘッダ (複数可) から `token` を取り出す
//!
//! サーバ側に失効リストは持たない。logout はクライアントが cookie を捨てる協調プロトコル。

use axum::http::{HeaderMap, header};

use crate::config::AppEnv;

pub const CREDENTIAL_COOKIE: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

/// Attributes attached to the credential cookie.
///
/// `HttpOnly` is not a knob: it is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookiePolicy {
    /// Production: `Secure` + `SameSite=None` (client is served from another site).
    /// Otherwise: no `Secure`, `SameSite=Strict` (browsers drop `None` without `Secure`).
    pub fn for_env(app_env: AppEnv) -> Self {
        if app_env.is_production() {
            Self {
                secure: true,
                same_site: SameSite::None,
            }
        } else {
            Self {
                secure: false,
                same_site: SameSite::Strict,
            }
        }
    }

    pub fn issue(&self, token: &str, max_age_seconds: u64) -> String {
        self.render(token, max_age_seconds)
    }

    pub fn expire(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age_seconds: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
            CREDENTIAL_COOKIE,
            value,
            max_age_seconds,
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extract the credential from the request's `Cookie` header(s).
///
/// An empty value (what logout leaves behind in some clients) counts as absent.
pub fn read_credential(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CREDENTIAL_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}
