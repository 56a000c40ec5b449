mod process;
mod run;
