use std::io::{self, Read};
use std::path::PathBuf;

use gumdrop::Options;
use serde::Serialize;

use admorph::constants::{
    DICTIONARY_AUTOMAT_FILE, DICTIONARY_GRAMMAR_FILE, DICTIONARY_MRD_FILE,
};
use admorph::dictionary::{compile_automaton, MorphologyBase};
use admorph::tokenizer::Tokenize;
use admorph::{Morph, MorphConfig};

trait OutputWriter {
    fn write_analysis(&mut self, word: &str, language: Option<&str>, lemmas: &[String], forms: &[String]);
    fn finish(&mut self);
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_analysis(&mut self, word: &str, language: Option<&str>, lemmas: &[String], forms: &[String]) {
        match language {
            Some(language) => println!("Input: {}\t\t[{}]", word, language),
            None => println!("Input: {}\t\t[unknown]", word),
        }
        for lemma in lemmas {
            println!("Lemma: {}", lemma);
        }
        for form in forms {
            println!("Form: {}", form);
        }
        println!();
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct AnalysisRecord {
    word: String,
    language: Option<String>,
    lemmas: Vec<String>,
    forms: Vec<String>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<AnalysisRecord>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_analysis(&mut self, word: &str, language: Option<&str>, lemmas: &[String], forms: &[String]) {
        self.results.push(AnalysisRecord {
            word: word.to_owned(),
            language: language.map(str::to_owned),
            lemmas: lemmas.to_vec(),
            forms: forms.to_vec(),
        });
    }

    fn finish(&mut self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap());
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "analyze words into lemmas and forms")]
    Analyze(AnalyzeArgs),

    #[options(help = "score how much of a document a search covers")]
    Intersect(IntersectArgs),

    #[options(help = "test whether a document contains any of the phrases")]
    Contains(ContainsArgs),

    #[options(help = "rewrite a phrase into lemmas")]
    Normalize(NormalizeArgs),

    #[options(help = "print input in word-separated tokenized form")]
    Tokenize(TokenizeArgs),

    #[options(help = "compile the word-form automaton of a dictionary folder")]
    Compile(CompileArgs),
}

#[derive(Debug, Options)]
struct AnalyzeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "d", help = "dictionary root folder")]
    dictionaries: Option<PathBuf>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be analyzed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct IntersectArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "d", help = "dictionary root folder")]
    dictionaries: Option<PathBuf>,

    #[options(short = "f", help = "file with the document text, stdin otherwise")]
    file: Option<PathBuf>,

    #[options(no_short, long = "any", help = "score searches longer than the document too")]
    any: bool,

    #[options(free, help = "search phrases")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct ContainsArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "d", help = "dictionary root folder")]
    dictionaries: Option<PathBuf>,

    #[options(short = "f", help = "file with the document text, stdin otherwise")]
    file: Option<PathBuf>,

    #[options(free, help = "search phrases")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct NormalizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "d", help = "dictionary root folder")]
    dictionaries: Option<PathBuf>,

    #[options(free, help = "text to be normalized")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct TokenizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(free, help = "text to be tokenized")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct CompileArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(free, required, help = "dictionary folder with morphs.mrd and gramtab.tab")]
    folder: PathBuf,
}

fn read_inputs(inputs: Vec<String>) -> anyhow::Result<String> {
    if inputs.is_empty() {
        eprintln!("Reading from stdin...");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(inputs.join(" "))
    }
}

fn load_engine(dictionaries: Option<PathBuf>) -> anyhow::Result<Morph> {
    let morph = Morph::new(dictionaries.as_deref(), &MorphConfig::default())?;
    Ok(morph)
}

fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let morph = load_engine(args.dictionaries)?;

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    let words: Vec<String> = if args.inputs.is_empty() {
        eprintln!("Reading from stdin...");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
            .trim()
            .split('\n')
            .map(|x| x.trim().to_string())
            .collect()
    } else {
        args.inputs
    };

    for word in words {
        let morphology = morph.morphology();
        let language = morphology.detect_language(&word);
        let analyzer = language.unwrap_or_else(|| morphology.main_language());
        let lemmas: Vec<String> = analyzer
            .morphology()
            .lemmas(&word)
            .iter()
            .map(|form| form.word.to_string())
            .collect();
        let forms: Vec<String> = analyzer
            .morphology()
            .forms(&word)
            .iter()
            .map(|form| form.word.to_string())
            .collect();
        writer.write_analysis(&word, language.map(|l| l.name()), &lemmas, &forms);
    }

    writer.finish();
    Ok(())
}

fn document_text(file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            eprintln!("Reading document from stdin...");
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn intersect(args: IntersectArgs) -> anyhow::Result<()> {
    let morph = load_engine(args.dictionaries)?;
    let text = document_text(args.file)?;
    let search = args.inputs.join("\n");
    let score = if args.any {
        morph.intersect_any(&text, &search)
    } else {
        morph.intersect(&text, &search)
    };
    println!("{}", score);
    Ok(())
}

fn contains(args: ContainsArgs) -> anyhow::Result<()> {
    let morph = load_engine(args.dictionaries)?;
    let text = document_text(args.file)?;
    let search = args.inputs.join("\n");
    println!("{}", morph.contains(&text, &search));
    Ok(())
}

fn normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let morph = load_engine(args.dictionaries)?;
    let text = read_inputs(args.inputs)?;
    println!("{}", morph.normalize_phrase(&text));
    Ok(())
}

fn tokenize(args: TokenizeArgs) -> anyhow::Result<()> {
    let inputs = read_inputs(args.inputs)?;
    for (index, token) in inputs.words() {
        println!("{:>4}: \"{}\"", index, token);
    }
    Ok(())
}

fn compile(args: CompileArgs) -> anyhow::Result<()> {
    let mrd = args.folder.join(DICTIONARY_MRD_FILE);
    let grammar = args.folder.join(DICTIONARY_GRAMMAR_FILE);
    let target = args.folder.join(DICTIONARY_AUTOMAT_FILE);
    let base = MorphologyBase::from_files(&mrd, &grammar, true)?;
    let builder = compile_automaton(&base)?;
    builder.write_to_file(&target)?;
    println!("Compiled {} states into {:?}", builder.state_count(), target);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Analyze(args)) => analyze(args),
        Some(Command::Intersect(args)) => intersect(args),
        Some(Command::Contains(args)) => contains(args),
        Some(Command::Normalize(args)) => normalize(args),
        Some(Command::Tokenize(args)) => tokenize(args),
        Some(Command::Compile(args)) => compile(args),
    }
}
