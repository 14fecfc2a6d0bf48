use rs_chanscrape::{convert_posts, convert_threads, Error, Site};

const BASE: &str = "https://example.org/";

const MALFORMED: &[&str] = &[
    "",
    "<label><input type=checkbox name=delete value=1><div class=message>unclosed",
    "<div class=\"message\">no post yet</div>",
    "<span class=\"filesize\"><a href=\"/b/src/1.jpg",
    "<td class=\"reply\" id=\"reply\"><div class=\"message\">empty id</div>",
    "<td class=\"reply\" id=\"reply5\"><span class=\"reflink\"><a>no href</a></span>",
    "<img class=\"thumb\" src=\"/b/thumb/1s.jpg\"><div class=\"nothumb\">",
    "<div class=\"omittedposts\">many posts omitted</div>",
    "<div class=\"post head\" data-id=\"!!\"><div class=\"post-header\"></div>",
    "<canvas width=\"wide\" height=\"tall\"><img class=\"media image\" src=\"a\">",
    "<span class=\"info-posts-count\">12</span>",
    "\u{0}\u{FFFD}<<>></ ><!-- unterminated",
    "<div data-ts=\"12\"><a class=\"post-topic\">topic</a>",
];

#[test]
fn site_pipelines_do_not_fail_on_malformed_markup() {
    for site in [Site::Wakaba, Site::Erlach] {
        for input in MALFORMED {
            assert!(
                convert_threads(site, BASE, "b", input).is_ok(),
                "{site} threads failed on {input:?}"
            );
            assert!(
                convert_posts(site, BASE, "b", input).is_ok(),
                "{site} posts failed on {input:?}"
            );
        }
    }
}

#[test]
fn unterminated_message_is_flushed_at_end_of_stream() {
    let page = "<label><input type=checkbox name=delete value=1></label><div class=message>cut off";
    let threads = convert_threads(Site::Wakaba, BASE, "b", page).expect("parse");
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].posts[0].comment.as_deref(), Some("cut off"));
}

#[test]
fn reply_with_empty_id_has_no_number() {
    let page = "<td class=\"reply\" id=\"reply\"><div class=\"message\">x</div></td>";
    let posts = convert_posts(Site::Wakaba, BASE, "b", page).expect("parse");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].post_number, None);
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = convert_threads(Site::Wakaba, "not a url", "b", "");
    assert!(matches!(result, Err(Error::InvalidLocator(_))));
}
