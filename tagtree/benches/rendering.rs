use divan::{Bencher, black_box};
use tagtree::{Attributes, RenderOptions, TagTree, attrs, render_from_array};

fn main() {
    divan::main();
}

/// A table with `rows` rows of four cells each.
fn table(rows: usize) -> TagTree {
    let mut tree = TagTree::new();
    let root = tree.root();
    let table = tree
        .add_with(root, "table", attrs([("class", "grid")]), "")
        .unwrap();
    let tbody = tree.add(table, "tbody").unwrap();
    for row in 0..rows {
        let tr = tree.add(tbody, "tr").unwrap();
        for col in 0..4 {
            let td = tree
                .add_with(tr, "td", Attributes::new(), &format!("{row}:{col}"))
                .unwrap();
            tree.add(td, "br").unwrap();
        }
    }
    tree
}

#[divan::bench(args = [10, 100, 1000])]
fn build(bencher: Bencher, rows: usize) {
    bencher.bench_local(|| black_box(table(rows)));
}

#[divan::bench(args = [10, 100, 1000])]
fn markup(bencher: Bencher, rows: usize) {
    let tree = table(rows);
    bencher.bench_local(|| {
        let html = black_box(&tree).to_html();
        black_box(html);
    });
}

#[divan::bench(args = [10, 100, 1000])]
fn markup_ignoring_wrappers(bencher: Bencher, rows: usize) {
    let tree = table(rows);
    let opts = RenderOptions::default().ignore_all(["table", "tbody"]);
    bencher.bench_local(|| {
        let html = black_box(&tree).html(tree.root(), &opts);
        black_box(html);
    });
}

#[divan::bench(args = [10, 100, 1000])]
fn json(bencher: Bencher, rows: usize) {
    let tree = table(rows);
    let opts = RenderOptions::default();
    bencher.bench_local(|| {
        let json = black_box(&tree).json(tree.root(), &opts).unwrap();
        black_box(json);
    });
}

#[divan::bench(args = [10, 100, 1000])]
fn from_array(bencher: Bencher, rows: usize) {
    let tree = table(rows);
    let records = tree.array(tree.root(), &RenderOptions::default());
    bencher.bench_local(|| {
        let html = render_from_array(black_box(&records)).unwrap();
        black_box(html);
    });
}
