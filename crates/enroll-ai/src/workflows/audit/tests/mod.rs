mod adjudication;
mod canonical;
mod common;
mod orchestrator;
mod routing;
