use std::sync::Arc;

use rs_chanscrape::encoding::{decode_markup, detect_encoding};
use rs_chanscrape::sites::WakabaParser;
use rs_chanscrape::{ChanConfiguration, ChanLocator, Markup, SiteParser};

fn parser() -> WakabaParser {
    let locator = ChanLocator::new("https://example.org/").expect("locator");
    WakabaParser::new(Arc::new(locator), ChanConfiguration::in_memory(), "b")
}

/// UTF-8 pages pass through unchanged.
#[test]
fn utf8_content_handled_correctly() {
    let page = "<label><input type=checkbox name=delete value=1><span class=\"filetitle\">é ñ ü 中文</span></label>\
                <div class=\"message\">ok</div>"
        .as_bytes();
    let threads = parser().convert_threads(Markup::Bytes(page)).expect("parse");
    assert_eq!(threads[0].posts[0].subject.as_deref(), Some("é ñ ü 中文"));
}

/// Shift_JIS declared through http-equiv is transcoded.
#[test]
fn shift_jis_http_equiv() {
    // "テスト" in Shift_JIS
    let mut page = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=Shift_JIS\">".to_vec();
    page.extend_from_slice(
        b"<label><input type=checkbox name=delete value=1><span class=\"postername\">\x83\x65\x83\x58\x83\x67</span></label><div class=\"message\">x</div>",
    );
    assert_eq!(detect_encoding(&page).name(), "Shift_JIS");
    let threads = parser().convert_threads(Markup::Bytes(&page)).expect("parse");
    assert_eq!(threads[0].posts[0].name.as_deref(), Some("テスト"));
}

/// A charset declared past the sniffing window is not honored.
#[test]
fn late_declaration_is_ignored() {
    let mut page = " ".repeat(2048).into_bytes();
    page.extend_from_slice(b"<meta charset=\"windows-1251\">\xc4\xe0");
    let decoded = decode_markup(&page);
    assert!(!decoded.contains("Да"));
    assert!(decoded.contains('\u{FFFD}'));
}
