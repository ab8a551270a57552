fn main() {
    // Generate the Android sources for the example schema into OUT_DIR.
    // Tests read them back from there, so normal builds are unaffected.
    dbtools_codegen::generate_from_cargo_metadata().expect("codegen failed");
}
