//! Performance benchmarks for rs-chanscrape.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Tokenizing a synthetic board page
//! - The wakaba pipeline over board pages of growing size

use std::fmt::Write as _;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rs_chanscrape::markup::Tokenizer;
use rs_chanscrape::{ChanConfiguration, ChanLocator, Markup, Site};

/// Board page with `threads` threads of one opening post and three replies.
fn board_page(threads: usize) -> String {
    let mut page = String::from(r#"<html><body><div class="logo">Random</div><form>"#);
    for t in 0..threads {
        let op = t * 10 + 1;
        let _ = write!(
            page,
            r#"<span class="filesize">File: <a href="/b/src/{op}.jpg" data-size="2048">{op}.jpg</a></span>
<a href="/b/src/{op}.jpg"><img class="thumb" src="/b/thumb/{op}s.jpg"></a>
<label><input type="checkbox" name="delete" value="{op}">
<span class="filetitle">Thread {t}</span> <span class="postername">Anon</span>
<span class="posterdate" data-timestamp="1684659600">21.05.23 Sun 12:00:00</span></label>
<span class="reflink"><a href="/b/res/{op}.html#{op}">No.{op}</a></span>
<div class="message">Opening post with <a href="/b/res/{op}.html#{op}">&gt;&gt;{op}</a> link</div>
<div class="omittedposts">12 posts omitted</div>"#
        );
        for r in 1..=3 {
            let n = op + r;
            let _ = write!(
                page,
                r#"<table><tbody><tr><td class="reply" id="reply{n}">
<label><input type="checkbox" name="delete" value="{n}"> <span class="postername">Anon</span></label>
<span class="reflink"><a href="/b/res/{op}.html#{n}">No.{n}</a></span>
<div class="message">Reply {n}<br>second line</div></td></tr></tbody></table>"#
            );
        }
    }
    page.push_str(r#"</form>[<a href="1.html">1</a>] [<a href="2.html">2</a>]</body></html>"#);
    page
}

fn bench_tokenize(c: &mut Criterion) {
    let page = board_page(10);
    c.bench_function("tokenize_board_page", |b| {
        b.iter(|| Tokenizer::new(black_box(&page)).count());
    });
}

fn bench_wakaba_threads(c: &mut Criterion) {
    let Ok(locator) = ChanLocator::new("https://example.org/") else {
        return;
    };
    let parser = Site::Wakaba.parser(Arc::new(locator), ChanConfiguration::in_memory(), "b");

    let mut group = c.benchmark_group("wakaba_threads");
    for threads in [1usize, 10, 50] {
        let page = board_page(threads);
        group.throughput(Throughput::Bytes(page.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &page, |b, page| {
            b.iter(|| parser.convert_threads(Markup::Text(black_box(page))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_wakaba_threads);
criterion_main!(benches);
