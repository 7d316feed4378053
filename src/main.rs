fn main() {
    caremate_lib::run()
}
