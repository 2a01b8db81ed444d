use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::thread;

use mrshuffle::codec::RecordReader;
use mrshuffle::workload::wc;
use mrshuffle::*;

fn read(path: &Path) -> Vec<KeyValue> {
    RecordReader::new(File::open(path).unwrap())
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn write_inputs(dir: &Path, inputs: &[&str]) -> Vec<PathBuf> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, contents)| {
            let path = dir.join(format!("input-{i}.txt"));
            fs::write(&path, contents).unwrap();
            path
        })
        .collect()
}

fn run_maps(layout: &JobLayout, inputs: &[PathBuf], n_reduce: usize, app: Workload) {
    for (map_task, input) in inputs.iter().enumerate() {
        let task = MapTask {
            map_task,
            input: input.clone(),
            n_reduce,
        };
        perform_map(layout, &task, app.map_fn).unwrap();
    }
}

fn run_reduces(layout: &JobLayout, n_map: usize, n_reduce: usize, app: Workload) -> Vec<PathBuf> {
    (0..n_reduce)
        .map(|reduce_task| {
            let task = ReduceTask { reduce_task, n_map };
            perform_reduce(layout, &task, app.reduce_fn).unwrap().output
        })
        .collect()
}

fn assert_strictly_sorted(records: &[KeyValue]) {
    for pair in records.windows(2) {
        assert!(pair[0].key < pair[1].key, "{:?} !< {:?}", pair[0], pair[1]);
    }
}

#[test]
fn word_count_over_two_maps_and_two_reduces() {
    let dir = tempfile::tempdir().unwrap();
    let layout = JobLayout::new(dir.path(), "wcseq");
    let wc = workload::named("wc").unwrap();
    let inputs = write_inputs(dir.path(), &["the quick", "the fox"]);

    run_maps(&layout, &inputs, 2, wc);

    // Both occurrences of "the" land in the same bucket, one per map task.
    let bucket = partition("the", 2);
    for map_task in 0..2 {
        let in_bucket = read(&layout.intermediate_path(map_task, bucket));
        assert!(in_bucket.contains(&KeyValue::new("the", "1")));
        let elsewhere = read(&layout.intermediate_path(map_task, 1 - bucket));
        assert!(!elsewhere.iter().any(|kv| kv.key() == "the"));
    }

    let mut counts = BTreeMap::new();
    for output in run_reduces(&layout, 2, 2, wc) {
        let records = read(&output);
        assert_strictly_sorted(&records);
        for kv in records {
            assert!(counts.insert(kv.key, kv.value).is_none());
        }
    }
    let expected = [("fox", "1"), ("quick", "1"), ("the", "2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>();
    assert_eq!(counts, expected);
}

#[test]
fn single_reducer_sees_every_key() {
    let dir = tempfile::tempdir().unwrap();
    let layout = JobLayout::new(dir.path(), "one");
    let wc = workload::named("wc").unwrap();
    let inputs = write_inputs(dir.path(), &["b a c", "c d", "a"]);

    run_maps(&layout, &inputs, 1, wc);
    for map_task in 0..3 {
        assert!(layout.intermediate_path(map_task, 0).exists());
        assert!(!layout.intermediate_path(map_task, 1).exists());
    }

    let outputs = run_reduces(&layout, 3, 1, wc);
    assert_eq!(
        read(&outputs[0]),
        vec![
            KeyValue::new("a", "2"),
            KeyValue::new("b", "1"),
            KeyValue::new("c", "2"),
            KeyValue::new("d", "1"),
        ]
    );
}

#[test]
fn single_mapper_output_is_reduced_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let layout = JobLayout::new(dir.path(), "ii");
    let ii = workload::named("ii").unwrap();
    let inputs = write_inputs(dir.path(), &["zeta alpha zeta mu"]);
    let doc = inputs[0].display().to_string();

    run_maps(&layout, &inputs, 3, ii);
    let mut all = Vec::new();
    for output in run_reduces(&layout, 1, 3, ii) {
        let records = read(&output);
        assert_strictly_sorted(&records);
        all.extend(records);
    }
    all.sort();
    assert_eq!(
        all,
        vec![
            KeyValue::new("alpha", format!("1 {doc}")),
            KeyValue::new("mu", format!("1 {doc}")),
            KeyValue::new("zeta", format!("1 {doc}")),
        ]
    );
}

#[test]
fn map_tasks_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let wc = workload::named("wc").unwrap();
    let inputs = write_inputs(dir.path(), &["one two three four five six seven eight nine ten"]);
    let first = JobLayout::new(dir.path(), "first");
    let second = JobLayout::new(dir.path(), "second");

    run_maps(&first, &inputs, 4, wc);
    run_maps(&second, &inputs, 4, wc);
    for r in 0..4 {
        assert_eq!(
            fs::read(first.intermediate_path(0, r)).unwrap(),
            fs::read(second.intermediate_path(0, r)).unwrap()
        );
    }

    // Running again under the same job overwrites with identical content.
    let before = fs::read(first.intermediate_path(0, 0)).unwrap();
    run_maps(&first, &inputs, 4, wc);
    assert_eq!(fs::read(first.intermediate_path(0, 0)).unwrap(), before);
}

#[test]
fn partitions_are_disjoint_and_complete() {
    let dir = tempfile::tempdir().unwrap();
    let layout = JobLayout::new(dir.path(), "cover");
    let app = workload::named("wc").unwrap();
    let texts = [
        "lorem ipsum dolor sit amet consectetur",
        "adipiscing elit sed do eiusmod tempor",
        "incididunt ut labore et dolore magna aliqua lorem",
    ];
    let inputs = write_inputs(dir.path(), &texts);
    let n_reduce = 5;
    run_maps(&layout, &inputs, n_reduce, app);

    for p in 0..n_reduce {
        let mut found = Vec::new();
        for m in 0..texts.len() {
            found.extend(read(&layout.intermediate_path(m, p)));
        }
        let mut expected = Vec::new();
        for text in texts {
            expected.extend(
                wc::map("", text)
                    .unwrap()
                    .into_iter()
                    .filter(|kv| partition(&kv.key, n_reduce) == p),
            );
        }
        found.sort();
        expected.sort();
        assert_eq!(found, expected, "partition {p}");
    }
}

#[test]
fn output_is_sorted_regardless_of_emission_order() {
    let dir = tempfile::tempdir().unwrap();
    let layout = JobLayout::new(dir.path(), "sorted");
    let inputs = write_inputs(dir.path(), &["", ""]);
    let backwards = |_: &str, _: &str| {
        Ok::<_, anyhow::Error>(
            ["zz", "yy", "b", "aa", "a"]
                .iter()
                .map(|k| KeyValue::new(*k, "v"))
                .collect::<Vec<_>>(),
        )
    };
    for (map_task, input) in inputs.iter().enumerate() {
        let task = MapTask {
            map_task,
            input: input.clone(),
            n_reduce: 1,
        };
        perform_map(&layout, &task, backwards).unwrap();
    }
    let task = ReduceTask {
        reduce_task: 0,
        n_map: 2,
    };
    let summary = perform_reduce(&layout, &task, |_, values| Ok(values.join(""))).unwrap();
    let keys = read(&summary.output)
        .into_iter()
        .map(KeyValue::into_key)
        .collect::<Vec<_>>();
    assert_eq!(keys, vec!["a", "aa", "b", "yy", "zz"]);
    assert_eq!(summary.records, 10);
}

#[test]
fn tasks_run_concurrently_on_threads() {
    let dir = tempfile::tempdir().unwrap();
    let layout = JobLayout::new(dir.path(), "threads");
    let wc = workload::named("wc").unwrap();
    let texts = ["a b c d", "b c d e", "c d e f", "d e f g"];
    let inputs = write_inputs(dir.path(), &texts);
    let n_reduce = 3;

    thread::scope(|s| {
        for (map_task, input) in inputs.iter().enumerate() {
            let layout = &layout;
            s.spawn(move || {
                let task = MapTask {
                    map_task,
                    input: input.clone(),
                    n_reduce,
                };
                perform_map(layout, &task, wc.map_fn).unwrap();
            });
        }
    });

    let outputs = thread::scope(|s| {
        let handles = (0..n_reduce)
            .map(|reduce_task| {
                let layout = &layout;
                s.spawn(move || {
                    let task = ReduceTask {
                        reduce_task,
                        n_map: texts.len(),
                    };
                    perform_reduce(layout, &task, wc.reduce_fn).unwrap().output
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    let mut keys = HashSet::new();
    let mut total = 0;
    for output in outputs {
        for kv in read(&output) {
            assert!(keys.insert(kv.key));
            total += kv.value.parse::<usize>().unwrap();
        }
    }
    assert_eq!(keys.len(), 7);
    assert_eq!(total, 16);
}

#[test]
fn failed_task_leaves_no_temporary_files() {
    let dir = tempfile::tempdir().unwrap();
    let layout = JobLayout::new(dir.path(), "fail");
    let inputs = write_inputs(dir.path(), &["a b"]);
    let task = MapTask {
        map_task: 0,
        input: inputs[0].clone(),
        n_reduce: 2,
    };
    perform_map(&layout, &task, wc::map).unwrap();

    // Only one of the two map tasks exists, so the reduce cannot finish.
    let task = ReduceTask {
        reduce_task: 0,
        n_map: 2,
    };
    let err = perform_reduce(&layout, &task, wc::reduce).unwrap_err();
    assert!(matches!(err, TaskError::OpenIntermediate { .. }));

    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.ends_with(".tmp") || name.contains("-res-"))
        .collect::<Vec<_>>();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}
