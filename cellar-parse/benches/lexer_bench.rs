//! Lexer benchmarks
//!
//! Run with: `cargo bench --package cellar-parse`

use cellar_parse::stanza::StanzaParser;
use cellar_parse::Lexer;
use cellar_util::diagnostic::Handler;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn create_handler() -> Handler {
    Handler::new()
}

fn lexer_token_count(source: &str) -> usize {
    let mut handler = create_handler();
    let lexer = Lexer::new(source, &mut handler);
    lexer.count()
}

fn stanza_count(source: &str) -> usize {
    let mut handler = create_handler();
    let lexer = Lexer::new(source, &mut handler);
    StanzaParser::new(lexer).parse_all().len()
}

const SINGLE_STANZA: &str = "Package: curl\n\
Version: 8.5.0-2\n\
Architecture: amd64\n\
Maintainer: Debian curl Maintainers <pkg-curl-maintainers@lists.alioth.debian.org>\n\
Depends: libc6 (>= 2.34), libcurl4 (= 8.5.0-2), zlib1g (>= 1:1.1.4)\n\
Section: web\n\
Priority: optional\n\
Description: command line tool for transferring data with URL syntax\n\
 curl is a command line tool for transferring data with URL syntax,\n\
 supporting FTP, FTPS, HTTP, HTTPS, SCP, SFTP, TFTP, TELNET, DICT, LDAP,\n\
 LDAPS, FILE, IMAP, SMTP, POP3 and RTSP.\n\
 .\n\
 curl supports SSL certificates, HTTP POST, HTTP PUT, FTP uploading, HTTP\n\
 form based upload, proxies, cookies, user+password authentication,\n\
 file transfer resume, http proxy tunneling and more.\n";

fn many_stanzas(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        out.push_str(&format!("Package: pkg-{i}\n"));
        out.push_str(&format!("Version: 1.{i}.0-1\n"));
        out.push_str("Depends: libc6 (>= 2.34)\n");
        out.push_str("Description: a generated package for benchmarking\n");
        out.push('\n');
    }
    out
}

fn bench_lexer_single_stanza(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_single_stanza");
    group.throughput(Throughput::Bytes(SINGLE_STANZA.len() as u64));

    group.bench_function("tokens", |b| {
        b.iter(|| lexer_token_count(black_box(SINGLE_STANZA)))
    });

    group.finish();
}

fn bench_lexer_many_stanzas(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_many_stanzas");

    for size in [10usize, 100, 1000] {
        let source = many_stanzas(size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(format!("tokens_{size}"), |b| {
            b.iter(|| lexer_token_count(black_box(&source)))
        });
    }

    group.finish();
}

fn bench_stanza_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("stanza_parsing");

    for size in [10usize, 100, 1000] {
        let source = many_stanzas(size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(format!("stanzas_{size}"), |b| {
            b.iter(|| stanza_count(black_box(&source)))
        });
    }

    group.finish();
}

fn bench_lexer_continuation_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_continuation_heavy");

    let mut source = String::from("Package: docs\nDescription: a package with a very long description\n");
    for i in 0..200 {
        source.push_str(&format!(" paragraph line number {i} of the description\n"));
    }
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("folded_description", |b| {
        b.iter(|| lexer_token_count(black_box(&source)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_single_stanza,
    bench_lexer_many_stanzas,
    bench_stanza_parsing,
    bench_lexer_continuation_heavy,
);
criterion_main!(benches);
