fn main() {
    rustfmosc::runtime::start();
}
