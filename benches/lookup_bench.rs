use ccip_gateway::name::{decode_labels, encode_name, namehash};
use ccip_gateway::record::CoinTable;
use ccip_gateway::store::{Snapshot, Tree};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Map, Value};

/// A snapshot with `n` token records under two basenames.
fn snapshot(n: usize) -> Tree {
    let mut root = Map::new();
    root.insert(".".to_string(), Value::Null);
    for i in 0..n {
        root.insert(
            format!("token{}", i),
            json!({
                "name": format!("Token {}", i),
                "address": format!("0x{:040x}", i + 1),
                "op_address": format!("0x{:040x}", i + 1),
            }),
        );
    }
    let doc = json!({ "basenames": ["tkn.eth", "tokens.eth"], "root": Value::Object(root) });
    Snapshot::from_slice(doc.to_string().as_bytes())
        .unwrap()
        .into_tree(CoinTable::standard())
        .unwrap()
}

fn labels(name: &str) -> Vec<String> {
    name.split('.').map(str::to_string).collect()
}

fn bench_tree_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_lookup");
    let tree = snapshot(1000);

    let direct = labels("token500.tkn.eth");
    let reverse = labels(&format!("{:040x}.1.addr.tokens.eth", 501));
    let alias = labels(&format!("0x{:040x}.tkn.eth", 501));
    let miss = labels("token500.other.eth");

    group.bench_function("direct", |b| b.iter(|| black_box(tree.lookup(black_box(&direct)))));
    group.bench_function("reverse", |b| b.iter(|| black_box(tree.lookup(black_box(&reverse)))));
    group.bench_function("address_label", |b| b.iter(|| black_box(tree.lookup(black_box(&alias)))));
    group.bench_function("basename_miss", |b| b.iter(|| black_box(tree.lookup(black_box(&miss)))));

    group.finish();
}

fn bench_tree_build(c: &mut Criterion) {
    c.bench_function("tree_build_1000", |b| b.iter(|| black_box(snapshot(1000))));
}

fn bench_name(c: &mut Criterion) {
    let wire = encode_name("wallet.base.tkn.eth").unwrap();
    c.bench_function("decode_labels", |b| b.iter(|| black_box(decode_labels(black_box(&wire)))));
    c.bench_function("namehash", |b| b.iter(|| black_box(namehash(black_box("wallet.base.tkn.eth")))));
}

criterion_group!(benches, bench_tree_lookup, bench_tree_build, bench_name);
criterion_main!(benches);
