use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use bioalg_rust::assembly::{self, AssembleOpt, AssemblyMethod};
use bioalg_rust::graph::{DegreeType, DirectedGraph};
use bioalg_rust::index::bwt::{BwtIndex, IndexMeta};
use bioalg_rust::io::{edges, fasta};
use bioalg_rust::util::seq::{self, Alphabet};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "bioalg-rust", author, version, about = "Graph algorithms, sequence assembly and BWT search", arg_required_else_help = true)]
struct Cli {
    /// Print debug logs (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Worker threads for parallel metrics (0 = all cores)
    #[arg(short = 't', long = "threads", global = true, default_value_t = 0)]
    threads: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a BWT index and optionally search patterns
    Bwt {
        /// FASTA file (first record is indexed)
        fasta: Option<String>,
        /// Literal sequence instead of a FASTA file
        #[arg(long, conflicts_with = "fasta")]
        seq: Option<String>,
        /// Pattern to search (repeatable)
        #[arg(short, long = "find")]
        find: Vec<String>,
        /// Print the suffix array
        #[arg(long = "suffix-array")]
        suffix_array: bool,
        /// Also report hits of each pattern's reverse complement
        #[arg(long = "both-strands")]
        both_strands: bool,
        /// Reject symbols outside this alphabet (detected when omitted)
        #[arg(long, value_enum)]
        alphabet: Option<Alphabet>,
        /// Save the index to this path
        #[arg(long)]
        save: Option<String>,
    },
    /// Reconstruct a sequence from k-mer fragments
    Assemble {
        /// Sequence to split into k-mers
        #[arg(long, conflicts_with = "fragments")]
        seq: Option<String>,
        /// File with one fragment per line
        #[arg(long)]
        fragments: Option<String>,
        #[arg(short, default_value_t = 3)]
        k: usize,
        #[arg(long, value_enum, default_value_t = AssemblyMethod::DeBruijn)]
        method: AssemblyMethod,
        /// Keep repeated fragments as distinct overlap-graph nodes
        #[arg(long)]
        reps: bool,
        /// Reject symbols outside this alphabet
        #[arg(long, value_enum)]
        alphabet: Option<Alphabet>,
    },
    /// Analyse a graph given as an edge list
    Graph {
        /// Edge list file: `origin dest` per line
        edges: String,
        /// Shortest path between two nodes
        #[arg(long, num_args = 2, value_names = ["SRC", "DST"])]
        path: Option<Vec<String>>,
        #[arg(long)]
        eulerian: bool,
        #[arg(long)]
        hamiltonian: bool,
        #[arg(long)]
        metrics: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("cannot configure thread pool")?;
    }

    match cli.command {
        Commands::Bwt { fasta, seq, find, suffix_array, both_strands, alphabet, save } => {
            let search = SearchOpt { show_sa: suffix_array, both_strands, alphabet };
            run_bwt(fasta.as_deref(), seq.as_deref(), &find, &search, save.as_deref())
        }
        Commands::Assemble { seq, fragments, k, method, reps, alphabet } => {
            let opt = AssembleOpt { k, method, with_reps: reps };
            run_assemble(seq.as_deref(), fragments.as_deref(), &opt, alphabet)
        }
        Commands::Graph { edges, path, eulerian, hamiltonian, metrics } => {
            run_graph(&edges, path.as_deref(), eulerian, hamiltonian, metrics)
        }
    }
}

struct SearchOpt {
    show_sa: bool,
    both_strands: bool,
    alphabet: Option<Alphabet>,
}

fn load_text(fasta_path: Option<&str>, literal: Option<&str>) -> Result<(Vec<u8>, String)> {
    let (raw, source) = match (fasta_path, literal) {
        (_, Some(s)) => (s.as_bytes().to_vec(), "<command line>".to_string()),
        (Some(p), None) => {
            let mut recs = fasta::read_fasta_file(p)?;
            if recs.is_empty() {
                bail!("FASTA file '{}' contains no sequences", p);
            }
            let rec = recs.swap_remove(0);
            info!("indexing record '{}' ({} bp)", rec.id, rec.seq.len());
            (rec.seq, p.to_string())
        }
        (None, None) => bail!("either a FASTA file or --seq is required"),
    };
    let mut text = seq::normalize_seq(&raw);
    if !text.contains(&seq::SENTINEL) {
        text.push(seq::SENTINEL);
    }
    Ok((text, source))
}

fn run_bwt(
    fasta_path: Option<&str>,
    literal: Option<&str>,
    patterns: &[String],
    search: &SearchOpt,
    save: Option<&str>,
) -> Result<()> {
    let (text, source) = load_text(fasta_path, literal)?;
    let body: Vec<u8> = text.iter().copied().filter(|&b| b != seq::SENTINEL).collect();
    match seq::resolve_alphabet(&body, search.alphabet).with_context(|| format!("invalid sequence in {}", source))? {
        Some(a) => info!("alphabet: {:?}", a),
        None => warn!("sequence contains symbols outside the DNA/RNA/protein alphabets"),
    }
    let mut idx = BwtIndex::build(&text)?;

    println!("length: {}", idx.len());
    println!("bwt: {}", idx.bwt_string());
    if search.show_sa {
        let sa: Vec<String> = idx.suffix_array().iter().map(|p| p.to_string()).collect();
        println!("suffix_array: {}", sa.join(" "));
    }
    for p in patterns {
        let pattern = seq::normalize_seq(p.as_bytes());
        if search.both_strands {
            let (fwd, rev) = idx.find_both_strands(&pattern)?;
            print_hits(p, "+", &fwd);
            print_hits(p, "-", &rev);
        } else {
            print_hits(p, "+", &idx.find_pattern(&pattern)?);
        }
    }

    if let Some(path) = save {
        idx.set_meta(IndexMeta {
            source: Some(source),
            build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
            build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
        });
        idx.save_to_file(path)
            .with_context(|| format!("cannot write index to '{}'", path))?;
        println!("BWT index saved: {}", path);
    }
    Ok(())
}

fn print_hits(pattern: &str, strand: &str, hits: &[usize]) {
    let hits: Vec<String> = hits.iter().map(|h| h.to_string()).collect();
    println!("{}\t{}\t{}\t{}", pattern, strand, hits.len(), hits.join(","));
}

fn run_assemble(
    literal: Option<&str>,
    fragments: Option<&str>,
    opt: &AssembleOpt,
    alphabet: Option<Alphabet>,
) -> Result<()> {
    let res = match (literal, fragments) {
        (Some(s), _) => {
            let s = seq::normalize_seq(s.as_bytes());
            if let Some(a) = alphabet {
                seq::validate(&s, a).context("invalid --seq")?;
            }
            let s = String::from_utf8(s).context("sequence is not valid UTF-8")?;
            assembly::assemble_sequence(&s, opt)?
        }
        (None, Some(path)) => {
            let fh = std::fs::File::open(path).with_context(|| format!("cannot open fragments '{}'", path))?;
            let frags = edges::read_fragments(std::io::BufReader::new(fh))?;
            info!("read {} fragments from {}", frags.len(), path);
            if let Some(a) = alphabet {
                for (i, f) in frags.iter().enumerate() {
                    seq::validate(f.as_bytes(), a).with_context(|| format!("fragment #{} in '{}'", i, path))?;
                }
            }
            assembly::assemble_fragments(&frags, opt)?
        }
        (None, None) => bail!("either --seq or --fragments is required"),
    };

    match res {
        Some(s) => println!("{}", s),
        None => warn!("no {:?} path found; fragments cannot be assembled", opt.method),
    }
    Ok(())
}

fn run_graph(path: &str, sp: Option<&[String]>, eulerian: bool, hamiltonian: bool, metrics: bool) -> Result<()> {
    let g = edges::read_edge_file(path)?;
    let (n, e) = g.size();
    info!("graph '{}': {} nodes, {} edges", path, n, e);
    print!("{}", g);

    if let Some([s, d]) = sp {
        match g.shortest_path_string(s, d)? {
            Some(p) => println!("shortest path {} -> {}: {}", s, d, p),
            None => println!("shortest path {} -> {}: unreachable", s, d),
        }
    }
    if eulerian {
        report_eulerian(&g);
    }
    if hamiltonian {
        match g.search_hamiltonian_path() {
            Some(p) => println!("hamiltonian path: {}", join(&p)),
            None => println!("hamiltonian path: none"),
        }
    }
    if metrics {
        report_metrics(&g);
    }
    Ok(())
}

fn report_eulerian(g: &DirectedGraph<String>) {
    println!("balanced: {}", g.is_balanced());
    if let Some((s, e)) = g.check_nearly_balanced() {
        println!("nearly balanced: start {}, end {}", s, e);
    }
    match g.eulerian_cycle() {
        Some(c) => println!("eulerian cycle: {}", join(&c)),
        None => println!("eulerian cycle: none"),
    }
    match g.eulerian_path() {
        Some(p) => println!("eulerian path: {}", join(&p)),
        None => println!("eulerian path: none"),
    }
}

fn report_metrics(g: &DirectedGraph<String>) {
    for t in [DegreeType::In, DegreeType::Out, DegreeType::InOut] {
        println!("mean {:?} degree: {:.4}", t, g.mean_degree(t));
    }
    for (d, p) in g.prob_degree(DegreeType::InOut) {
        println!("P(degree = {}) = {:.4}", d, p);
    }
    let md = g.mean_distances();
    println!("mean distance: {:.4} (reachable pairs: {:.4})", md.mean, md.reachable_fraction);
    println!("mean clustering coefficient: {:.4}", g.mean_clustering_coef());
    println!("has cycle: {}", g.has_cycle());
}

fn join(nodes: &[&String]) -> String {
    nodes.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" -> ")
}
