use StoichCalc::Examples::stoichiometry_examples::stoich_examples;
use StoichCalc::Utils::logger::init_logger;

pub fn main() {
    init_logger(log::LevelFilter::Info);
    let task: usize = 1;
    stoich_examples(task);
}
