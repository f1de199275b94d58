fn main() -> anyhow::Result<()> {
    pollster::block_on(aim_trainer::run())
}
