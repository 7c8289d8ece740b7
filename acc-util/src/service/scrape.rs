use reqwest::StatusCode;
use scraper::{ElementRef, Html, Selector};

use crate::service::Session;
use crate::{regex, select, AccError, Console, Result};

/// A page that can be fetched from the session's base url.
pub trait GetHtml {
    fn path(&self) -> String;

    fn get_html(&self, session: &mut Session, cnsl: &mut Console) -> Result<(StatusCode, Html)> {
        let res = session.get(&self.path())?.send(cnsl)?;
        let status = res.status();
        let html = res
            .text()
            .map(|text| Html::parse_document(&text))
            .map_err(AccError::Transport)?;
        Ok((status, html))
    }
}

pub trait Scrape {
    fn elem(&self) -> ElementRef;

    fn find_first(&self, selector: &Selector) -> Option<ElementRef> {
        self.elem().select(selector).next()
    }

    fn inner_text(&self) -> String {
        self.elem().text().fold(String::new(), |mut ret, s| {
            ret.push_str(s);
            ret
        })
    }
}

impl Scrape for ElementRef<'_> {
    fn elem(&self) -> ElementRef {
        *self
    }
}

pub trait ExtractCsrfToken: Scrape {
    /// Extracts the anti-forgery token of the first form matching `form`.
    fn extract_csrf_token(&self, form: &Selector) -> Result<String> {
        let token = self
            .find_first(form)
            .ok_or(AccError::NotFound("form"))?
            .select(select!("input[name=\"csrf_token\"]"))
            .next()
            .and_then(|input| input.value().attr("value"))
            .ok_or(AccError::NotFound("csrf token"))?;
        if token.is_empty() {
            Err(AccError::NotFound("csrf token").into())
        } else {
            Ok(token.to_owned())
        }
    }
}

/// Parses the leading integer of texts like `"123 Byte"` or `"5 ms"`.
pub fn parse_leading_u64(text: &str, what: &'static str) -> Result<u64> {
    regex!(r"^\s*(\d+)")
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| {
            AccError::Parse {
                what,
                input: text.trim().to_owned(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Page(Html);

    impl Scrape for Page {
        fn elem(&self) -> ElementRef {
            self.0.root_element()
        }
    }

    impl ExtractCsrfToken for Page {}

    const HTML: &str = r#"
<html><body>
<form action="/search"><input type="hidden" name="q" value="x"></form>
<form action="" method="POST">
  <input type="text" name="username">
  <input type="hidden" name="csrf_token" value="tok+en/=">
</form>
<form class="form-code-submit"><input type="hidden" name="csrf_token" value=""></form>
</body></html>
"#;

    #[test]
    fn test_extract_csrf_token() -> anyhow::Result<()> {
        let page = Page(Html::parse_document(HTML));
        let form = Selector::parse("form[action=\"\"]").unwrap();
        assert_eq!(page.extract_csrf_token(&form)?, "tok+en/=");
        // same document, same token
        assert_eq!(page.extract_csrf_token(&form)?, "tok+en/=");
        Ok(())
    }

    #[test]
    fn test_extract_csrf_token_failure() {
        let page = Page(Html::parse_document(HTML));
        let tests = &["form.form-code-submit", "form[action=\"/search\"]", "form#missing"];
        for selectors in tests {
            let form = Selector::parse(selectors).unwrap();
            let err = page.extract_csrf_token(&form).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<AccError>(), Some(AccError::NotFound(_))),
                "{}",
                selectors
            );
        }
    }

    #[test]
    fn test_parse_leading_u64() -> anyhow::Result<()> {
        assert_eq!(parse_leading_u64("123 Byte", "code size")?, 123);
        assert_eq!(parse_leading_u64("  5 ms\n", "time")?, 5);
        assert!(parse_leading_u64("- ms", "time").is_err());
        assert!(parse_leading_u64("", "time").is_err());
        Ok(())
    }
}
